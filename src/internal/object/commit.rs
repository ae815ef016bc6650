//! The Commit object represents a specific version of a project's tracked
//! files at a particular point in time, together with the structured
//! metadata the Interaction Recorder attaches to a commit's message body.
//!
//! Each commit object contains:
//!
//! - A unique SHA-1/SHA-256 hash that identifies the commit.
//! - The author and committer of the commit (which may differ).
//! - The date and time the commit was made.
//! - A commit message describing the change, carrying the
//!   `Files:`/`Prompt:`/`Response:`/`Plan:`/`Source:` lines documented in
//!   `MemovMessage` below.
//! - A reference to the parent commit(s) the new commit is based on.
//! - The tree recording the full state of tracked files at commit time.
use std::fmt::Display;
use std::str::FromStr;

use bincode::{Decode, Encode};
use bstr::ByteSlice;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::GitError;
use crate::hash::ObjectHash;
use crate::internal::object::ObjectTrait;
use crate::internal::object::ObjectType;
use crate::internal::object::signature::Signature;
use crate::internal::object::types::CommitSource;

/// The `Commit` struct is used to represent a commit object.
///
/// - `tree_id` points to the top-level tree for this commit, which reflects
///   the complete state of tracked files at the time of the commit.
/// - `parent_commit_ids` lets the store build the full commit history as a
///   linked list (memov never creates merge commits, so this holds at most
///   one parent, but the field stays a `Vec` to match the underlying Git
///   object format).
/// - `author`/`committer` carry name, email, timestamp, and timezone.
/// - `message` is free text; for commits produced by the Interaction
///   Recorder it follows the `MemovMessage` layout.
#[derive(Eq, Debug, Clone, Serialize, Deserialize, Decode, Encode)]
pub struct Commit {
    pub id: ObjectHash,
    pub tree_id: ObjectHash,
    pub parent_commit_ids: Vec<ObjectHash>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}
impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for Commit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "tree: {}", self.tree_id)?;
        for parent in self.parent_commit_ids.iter() {
            writeln!(f, "parent: {parent}")?;
        }
        writeln!(f, "author {}", self.author)?;
        writeln!(f, "committer {}", self.committer)?;
        writeln!(f, "{}", self.message)
    }
}

impl Commit {
    pub fn new(
        author: Signature,
        committer: Signature,
        tree_id: ObjectHash,
        parent_commit_ids: Vec<ObjectHash>,
        message: &str,
    ) -> Commit {
        let mut commit = Commit {
            id: ObjectHash::default(),
            tree_id,
            parent_commit_ids,
            author,
            committer,
            message: message.to_string(),
        };
        let hash = ObjectHash::from_type_and_data(ObjectType::Commit, &commit.to_data().unwrap());
        commit.id = hash;
        commit
    }

    /// Creates a new commit from a tree ID, parent list, and message, using
    /// `identity` (name, email) for both author and committer and the
    /// current time for both timestamps.
    ///
    /// Unlike a one-shot version-control tool, memov never distinguishes
    /// author from committer identity: every commit, whether produced by a
    /// manual edit or an AI snapshot, is attributed to the single identity
    /// configured for the project (see `crate::config::MemovConfig`).
    pub fn from_tree_id(
        tree_id: ObjectHash,
        parent_commit_ids: Vec<ObjectHash>,
        message: &str,
        identity: (&str, &str),
    ) -> Commit {
        let (name, email) = identity;
        let now = chrono::Utc::now().timestamp();
        let author = Signature::new(name, email, now);
        let committer = Signature::new(name, email, now);
        Commit::new(author, committer, tree_id, parent_commit_ids, message)
    }

    /// Extracts the first meaningful line of the commit message: the
    /// operation verb for recorder-produced commits (`snapshot`, `track`,
    /// `rename file.txt -> file2.txt`, `remove file.txt`).
    pub fn format_message(&self) -> String {
        self.message
            .lines()
            .find(|line| !line.trim().is_empty())
            .map(|line| line.to_owned())
            .unwrap_or_else(|| self.message.clone())
    }
}

impl ObjectTrait for Commit {
    fn from_bytes(data: &[u8], hash: ObjectHash) -> Result<Self, GitError>
    where
        Self: Sized,
    {
        let mut commit = data;
        let tree_end = commit
            .find_byte(0x0a)
            .ok_or_else(|| GitError::InvalidCommitObject)?;
        let tree_id: ObjectHash = ObjectHash::from_str(
            String::from_utf8(commit[5..tree_end].to_owned())
                .map_err(|e| GitError::ConversionError(e.to_string()))?
                .as_str(),
        )
        .map_err(GitError::InvalidHashValue)?;
        let binding = commit[tree_end + 1..].to_vec();
        commit = &binding;

        let author_begin = commit
            .find("author")
            .ok_or_else(|| GitError::InvalidCommitObject)?;
        let parent_commit_ids: Vec<ObjectHash> = commit[..author_begin]
            .find_iter("parent")
            .map(|parent| {
                let parent_end = commit[parent..].find_byte(0x0a).unwrap_or(commit.len());
                ObjectHash::from_str(
                    String::from_utf8(commit[parent + 7..parent + parent_end].to_owned())
                        .unwrap_or_default()
                        .as_str(),
                )
                .unwrap_or_default()
            })
            .collect();
        let binding = commit[author_begin..].to_vec();
        commit = &binding;

        let author_end = commit
            .find_byte(0x0a)
            .ok_or_else(|| GitError::InvalidCommitObject)?;
        let author = Signature::from_data(commit[..author_end].to_vec())?;

        let binding = commit[author_end + 1..].to_vec();
        commit = &binding;
        let committer_end = commit
            .find_byte(0x0a)
            .ok_or_else(|| GitError::InvalidCommitObject)?;
        let committer = Signature::from_data(commit[..committer_end].to_vec())?;

        let message = String::from_utf8_lossy(&commit[committer_end + 1..]).into_owned();
        Ok(Commit {
            id: hash,
            tree_id,
            parent_commit_ids,
            author,
            committer,
            message,
        })
    }

    fn get_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn get_size(&self) -> usize {
        self.message.len()
    }

    /// [Git-Internals-Git-Objects](https://git-scm.com/book/en/v2/Git-Internals-Git-Objects)
    fn to_data(&self) -> Result<Vec<u8>, GitError> {
        let mut data = Vec::new();

        data.extend(b"tree ");
        data.extend(self.tree_id.to_string().as_bytes());
        data.extend(&[0x0a]);

        for parent_tree_id in &self.parent_commit_ids {
            data.extend(b"parent ");
            data.extend(parent_tree_id.to_string().as_bytes());
            data.extend(&[0x0a]);
        }

        data.extend(b"author ");
        data.extend(self.author.to_data()?);
        data.extend(&[0x0a]);
        data.extend(b"committer ");
        data.extend(self.committer.to_data()?);
        data.extend(&[0x0a]);
        // Important: no blank line before the message, or a real `git
        // cat-file`/`unpack-objects` against `.mem/memov.git` fails to parse
        // the object back.
        data.extend(self.message.as_bytes());

        Ok(data)
    }
}

/// The structured body the Interaction Recorder writes into a commit
/// message, per the external commit-message format:
///
/// ```text
/// <operation verb>
///
/// Files: a.rs, b.rs
/// Prompt: <prompt text>
/// Response: <response text>
/// Plan: <plan text>
/// Source: User|AI
/// ```
///
/// `Prompt`/`Response`/`Plan` are omitted entirely when absent rather than
/// written as empty values, so a manual-edit commit's body is just the
/// summary line, `Files:`, and `Source: User`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemovMessage {
    pub summary: String,
    pub files: Vec<String>,
    pub prompt: Option<String>,
    pub response: Option<String>,
    pub plan: Option<String>,
    pub source: CommitSource,
}

impl MemovMessage {
    pub fn to_body(&self) -> String {
        let mut body = String::new();
        body.push_str(&self.summary);
        body.push_str("\n\n");
        body.push_str("Files: ");
        body.push_str(&self.files.join(", "));
        body.push('\n');
        if let Some(prompt) = &self.prompt {
            body.push_str("Prompt: ");
            body.push_str(&prompt.replace('\n', " "));
            body.push('\n');
        }
        if let Some(response) = &self.response {
            body.push_str("Response: ");
            body.push_str(&response.replace('\n', " "));
            body.push('\n');
        }
        if let Some(plan) = &self.plan {
            body.push_str("Plan: ");
            body.push_str(&plan.replace('\n', " "));
            body.push('\n');
        }
        body.push_str("Source: ");
        body.push_str(&self.source.to_string());
        body
    }

    /// Parse a commit message body back into its structured fields.
    ///
    /// Unrecognized lines are ignored rather than rejected: commits created
    /// outside the recorder (or hand-edited) should still display without
    /// erroring out the whole history view.
    pub fn parse(body: &str) -> MemovMessage {
        let mut lines = body.lines();
        let summary = lines
            .by_ref()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("")
            .to_string();

        let mut files = Vec::new();
        let mut prompt = None;
        let mut response = None;
        let mut plan = None;
        let mut source = CommitSource::User;

        for line in lines {
            if let Some(rest) = line.strip_prefix("Files:") {
                files = rest
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            } else if let Some(rest) = line.strip_prefix("Prompt:") {
                prompt = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("Response:") {
                response = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("Plan:") {
                plan = Some(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("Source:") {
                source = rest.trim().parse().unwrap_or(CommitSource::User);
            }
        }

        MemovMessage {
            summary,
            files,
            prompt,
            response,
            plan,
            source,
        }
    }
}
