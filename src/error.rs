//! Engine-level error type. Where `errors::GitError` reports object-store
//! failures, `MemovError` reports failures of the public API surface:
//! project discovery, snapshot/commit orchestration, and the recorder's
//! workflow.

use thiserror::Error;

use crate::errors::GitError;

#[derive(Error, Debug)]
pub enum MemovError {
    /// No `.mem` directory was found in the given path or any ancestor.
    #[error("no memov project found at or above `{0}`")]
    ProjectNotFound(String),

    /// A `.mem` directory exists but its object store hasn't been
    /// initialized (missing `memov.git`/`branches.json`).
    #[error("memov store at `{0}` is not initialized")]
    StoreNotInitialized(String),

    /// The snapshot engine could not complete a commit.
    #[error("commit failed: {0}")]
    CommitFailed(String),

    /// An operation referenced a path that isn't tracked.
    #[error("file not tracked: {0}")]
    FileNotTracked(String),

    /// A path argument resolved outside the project root.
    #[error("path outside project: {0}")]
    PathOutsideProject(String),

    /// Object-store-level failure, passed through from the lower layer.
    #[error(transparent)]
    Store(#[from] GitError),

    /// I/O failure not already wrapped by `GitError`.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for failures that don't fit a named variant.
    #[error("{0}")]
    Unknown(String),
}
