//! Error types for the object-store layer.
//!
//! This module defines a unified error enumeration used across object
//! parsing, on-disk encoding/decoding, and path resolution. It integrates
//! with `thiserror` to provide rich `Display` implementations and error
//! source chaining where applicable.
//!
//! Higher-level failures (project discovery, commit orchestration, the
//! recorder's workflow) are reported through `crate::error::MemovError`,
//! which wraps this enum rather than duplicating it.

use thiserror::Error;

#[derive(Error, Debug)]
/// Unified error enumeration for the object-store layer.
pub enum GitError {
    /// Invalid or unsupported object type name.
    #[error("The `{0}` is not a valid object type.")]
    InvalidObjectType(String),

    /// Malformed or unsupported blob object encoding.
    #[error("The `{0}` is not a valid blob object.")]
    InvalidBlobObject(String),

    /// Malformed tree object.
    #[error("Not a valid tree object.")]
    InvalidTreeObject,

    /// Invalid tree entry (mode/name/hash).
    #[error("The `{0}` is not a valid tree item.")]
    InvalidTreeItem(String),

    /// Tree contains no entries.
    #[error("`{0}`.")]
    EmptyTreeItems(String),

    /// Invalid commit signature line.
    #[error("The `{0}` is not a valid commit signature.")]
    InvalidSignatureType(String),

    /// Malformed commit object.
    #[error("Not a valid commit object.")]
    InvalidCommitObject,

    /// Commit parse or validation failed.
    #[error("Invalid commit: {0}")]
    InvalidCommit(String),

    /// Malformed note object.
    #[error("Not a valid note object: {0}")]
    InvalidNoteObject(String),

    /// Invalid CLI or function argument.
    #[error("Argument parse failed: {0}")]
    InvalidArgument(String),

    /// I/O error from the underlying filesystem.
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    /// Invalid hash formatting or value.
    #[error("The {0} is not a valid hash value")]
    InvalidHashValue(String),

    /// Text encoding or UTF-8 conversion error.
    #[error("UTF-8 conversion error: {0}")]
    ConversionError(String),

    /// Invalid path when resolving a workspace-relative location.
    #[error("Invalid path: {0}")]
    InvalidPathError(String),

    /// Object missing from the store.
    #[error("Can't find object: {0}")]
    ObjectNotFound(String),

    /// Generic custom error for miscellaneous failures.
    #[error("{0}")]
    CustomError(String),
}
