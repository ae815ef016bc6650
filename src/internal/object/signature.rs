//! Author/committer signature lines embedded in a commit object, matching
//! Git's own `"<name> <<email>> <timestamp> <timezone>"` wire format.

use std::fmt::Display;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::errors::GitError;

/// A name, email, and timestamp attributed to a commit.
///
/// memov always stores the same identity as both author and committer (see
/// `Commit::from_tree_id`), but the two fields are kept distinct to match
/// the on-disk object format and to leave room for a future mode where the
/// committer differs from the author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Decode, Encode)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Offset from UTC in `+HHMM`/`-HHMM` form. memov always writes `+0000`
    /// since every commit's timestamp is already recorded in UTC.
    pub timezone: String,
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} <{}> {} {}",
            self.name, self.email, self.timestamp, self.timezone
        )
    }
}

impl Signature {
    pub fn new(name: &str, email: &str, timestamp: i64) -> Signature {
        Signature {
            name: name.to_string(),
            email: email.to_string(),
            timestamp,
            timezone: "+0000".to_string(),
        }
    }

    /// Parses an `author`/`committer` line, including its leading keyword
    /// (`"author "` or `"committer "`).
    pub fn from_data(data: Vec<u8>) -> Result<Signature, GitError> {
        let text = String::from_utf8(data).map_err(|e| GitError::ConversionError(e.to_string()))?;
        let rest = text
            .split_once(' ')
            .map(|(_, rest)| rest)
            .ok_or_else(|| GitError::InvalidSignatureType(text.clone()))?;

        let email_start = rest
            .find('<')
            .ok_or_else(|| GitError::InvalidSignatureType(text.clone()))?;
        let email_end = rest
            .find('>')
            .ok_or_else(|| GitError::InvalidSignatureType(text.clone()))?;
        let name = rest[..email_start].trim().to_string();
        let email = rest[email_start + 1..email_end].to_string();

        let mut fields = rest[email_end + 1..].trim().split_whitespace();
        let timestamp: i64 = fields
            .next()
            .ok_or_else(|| GitError::InvalidSignatureType(text.clone()))?
            .parse()
            .map_err(|_| GitError::InvalidSignatureType(text.clone()))?;
        let timezone = fields.next().unwrap_or("+0000").to_string();

        Ok(Signature {
            name,
            email,
            timestamp,
            timezone,
        })
    }

    /// Serializes the signature as `"<name> <<email>> <timestamp> <timezone>"`,
    /// without the leading `author`/`committer` keyword; the caller prepends
    /// whichever keyword applies.
    pub fn to_data(&self) -> Result<Vec<u8>, GitError> {
        Ok(self.to_string().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let sig = Signature::new("memov-user", "user@example.com", 1_700_000_000);
        let mut line = b"author ".to_vec();
        line.extend(sig.to_data().unwrap());
        let parsed = Signature::from_data(line).unwrap();
        assert_eq!(sig, parsed);
    }

    #[test]
    fn test_display_format() {
        let sig = Signature::new("memov-user", "user@example.com", 42);
        assert_eq!(sig.to_string(), "memov-user <user@example.com> 42 +0000");
    }

    #[test]
    fn test_from_data_rejects_malformed_input() {
        assert!(Signature::from_data(b"author not-a-signature".to_vec()).is_err());
    }
}
