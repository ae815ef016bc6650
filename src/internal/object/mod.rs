//! Object model definitions for the content-addressed store: blobs, trees,
//! commits, and notes, plus the `ObjectTrait` that lets callers round-trip a
//! strongly typed value through raw bytes.

pub mod blob;
pub mod commit;
pub mod note;
pub mod signature;
pub mod tree;
pub mod types;

use std::fmt::Display;

use crate::errors::GitError;
use crate::hash::ObjectHash;
pub use crate::internal::object::types::ObjectType;

/// Common interface for the three base object kinds (blob, tree, commit).
///
/// Notes also implement this trait (as `ObjectType::Blob`), matching Git's
/// own choice to store notes as ordinary blobs.
pub trait ObjectTrait: Send + Sync + Display {
    /// Parse an object from its decompressed on-disk payload.
    fn from_bytes(data: &[u8], hash: ObjectHash) -> Result<Self, GitError>
    where
        Self: Sized;

    fn get_type(&self) -> ObjectType;

    fn get_size(&self) -> usize;

    /// Serialize the object's payload (the part that goes after the
    /// `"<type> <len>\0"` header).
    fn to_data(&self) -> Result<Vec<u8>, GitError>;

    /// Computes the object hash from serialized data.
    ///
    /// Default implementation serializes the object and computes the hash
    /// from that data. Override only if you need custom hash computation or
    /// caching.
    fn object_hash(&self) -> Result<ObjectHash, GitError> {
        let data = self.to_data()?;
        Ok(ObjectHash::from_type_and_data(self.get_type(), &data))
    }
}
