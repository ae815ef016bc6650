//! Object type enumeration and small value types shared across the object
//! model.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::errors::GitError;

/// The three base object kinds stored in the content-addressed store.
///
/// Matches Git's own numbering for the kinds it shares (`blob`=3, `tree`=2,
/// `commit`=1) so that `.mem/memov.git` stays byte-compatible with real Git
/// loose-object tooling, even though memov never writes a pack file.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Commit = 1,
    Tree = 2,
    Blob = 3,
}

const COMMIT_OBJECT_TYPE: &[u8] = b"commit";
const TREE_OBJECT_TYPE: &[u8] = b"tree";
const BLOB_OBJECT_TYPE: &[u8] = b"blob";

impl Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ObjectType::Blob => write!(f, "blob"),
            ObjectType::Tree => write!(f, "tree"),
            ObjectType::Commit => write!(f, "commit"),
        }
    }
}

impl ObjectType {
    /// ASCII byte representation used in the `"<type> <len>\0"` object header.
    pub fn to_bytes(&self) -> &'static [u8] {
        match self {
            ObjectType::Commit => COMMIT_OBJECT_TYPE,
            ObjectType::Tree => TREE_OBJECT_TYPE,
            ObjectType::Blob => BLOB_OBJECT_TYPE,
        }
    }

    /// Parses a string representation of an object type.
    pub fn from_string(s: &str) -> Result<ObjectType, GitError> {
        match s {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            _ => Err(GitError::InvalidObjectType(s.to_string())),
        }
    }

    /// Convert an object type to its header byte vector.
    pub fn to_data(self) -> Result<Vec<u8>, GitError> {
        Ok(self.to_bytes().to_vec())
    }
}

/// Who authored a commit: a human editing the workspace directly, or an AI
/// agent acting through the Interaction Recorder.
///
/// Mirrors `Source: User|AI` in the commit-message format (see
/// `internal::object::commit`). Kept as a two-valued enum rather than the
/// broader human/agent/system/mcp-client actor taxonomy some object stores
/// use, because nothing in this crate's data model needs finer granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitSource {
    User,
    Ai,
}

impl Display for CommitSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitSource::User => write!(f, "User"),
            CommitSource::Ai => write!(f, "AI"),
        }
    }
}

impl std::str::FromStr for CommitSource {
    type Err = GitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(CommitSource::User),
            "AI" => Ok(CommitSource::Ai),
            other => Err(GitError::CustomError(format!(
                "unknown commit source `{other}`"
            ))),
        }
    }
}
