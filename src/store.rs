//! Component A: the content-addressed Object Store.
//!
//! Objects are written exactly as Git loose objects:
//! `zlib_deflate("<type> <byte-length>\0<payload>")` at
//! `objects/<first 2 hex>/<remaining hex>`, so `.mem/memov.git` stays
//! byte-compatible with real `git cat-file` tooling, the same property the
//! original Python implementation relied on by shelling out to `git`
//! itself.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use tracing::debug;

use crate::error::MemovError;
use crate::errors::GitError;
use crate::hash::ObjectHash;
use crate::internal::object::blob::Blob;
use crate::internal::object::tree::{EntryMode, Tree};
use crate::internal::object::{ObjectTrait, ObjectType};
use crate::utils::{CountingReader, HashAlgorithm};

/// A loose-object store rooted at `.mem/memov.git`.
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    /// Creates the `objects/` directory under a fresh `.mem/memov.git`.
    pub fn init(mem_dir: &Path) -> Result<ObjectStore, MemovError> {
        let root = mem_dir.join("memov.git");
        std::fs::create_dir_all(root.join("objects"))?;
        Ok(ObjectStore { root })
    }

    /// Opens an existing store without creating anything.
    pub fn open(mem_dir: &Path) -> Result<ObjectStore, MemovError> {
        let root = mem_dir.join("memov.git");
        if !root.join("objects").is_dir() {
            return Err(MemovError::StoreNotInitialized(
                mem_dir.display().to_string(),
            ));
        }
        Ok(ObjectStore { root })
    }

    fn object_path(&self, hash: &ObjectHash) -> PathBuf {
        let hex = hash.to_string();
        self.root.join("objects").join(&hex[..2]).join(&hex[2..])
    }

    pub fn has_object(&self, hash: &ObjectHash) -> bool {
        self.object_path(hash).is_file()
    }

    /// Serializes, hashes, and writes an object to disk. Writing an object
    /// that already exists is a silent no-op, identical bytes hash to the
    /// identical path, so there is nothing new to write.
    pub fn write_object<T: ObjectTrait>(&self, object: &T) -> Result<ObjectHash, MemovError> {
        let payload = object.to_data().map_err(MemovError::Store)?;
        let hash = ObjectHash::from_type_and_data(object.get_type(), &payload);
        let path = self.object_path(&hash);
        if path.is_file() {
            return Ok(hash);
        }

        let mut header = Vec::new();
        header.extend(object.get_type().to_bytes());
        header.push(b' ');
        header.extend(payload.len().to_string().as_bytes());
        header.push(0);
        header.extend(&payload);

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&header)?;
        let compressed = encoder.finish()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, compressed)?;
        debug!(hash = %hash, kind = %object.get_type(), "wrote object");
        Ok(hash)
    }

    /// Reads and decodes an object, asserting its on-disk type matches `T`.
    pub fn read_object<T: ObjectTrait>(&self, hash: &ObjectHash) -> Result<T, MemovError> {
        let path = self.object_path(hash);
        let compressed = std::fs::read(&path)
            .map_err(|_| MemovError::Store(GitError::ObjectNotFound(hash.to_string())))?;

        let mut decoder = CountingReader::new(ZlibDecoder::new(compressed.as_slice()));
        let mut raw = Vec::new();
        decoder.read_to_end(&mut raw)?;
        debug!(hash = %hash, bytes = decoder.bytes_read, "inflated object");

        let mut verifier = HashAlgorithm::new();
        verifier.update(&raw);
        if verifier.finalize() != hash.as_ref() {
            return Err(MemovError::Store(GitError::CustomError(format!(
                "object {hash} failed integrity check: on-disk content hashes to a different id",
            ))));
        }

        let nul = raw
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| MemovError::Store(GitError::CustomError(
                "malformed object: missing header terminator".to_string(),
            )))?;
        let header = std::str::from_utf8(&raw[..nul])
            .map_err(|e| MemovError::Store(GitError::ConversionError(e.to_string())))?;
        let (type_name, _len) = header
            .split_once(' ')
            .ok_or_else(|| MemovError::Store(GitError::CustomError(
                "malformed object header".to_string(),
            )))?;
        let object_type = ObjectType::from_string(type_name).map_err(MemovError::Store)?;

        let payload = &raw[nul + 1..];
        let object = T::from_bytes(payload, *hash).map_err(MemovError::Store)?;
        if object.get_type() != object_type {
            return Err(MemovError::Store(GitError::InvalidObjectType(
                type_name.to_string(),
            )));
        }
        Ok(object)
    }

    /// Builds a tar byte-stream of every blob reachable from `tree_id`, at
    /// the paths its tree entries name. `jump` extracts this to restore a
    /// workspace to a past commit, and `archive(commit) -> extract ->
    /// snapshot_all` reproducing the same tree id is the store's own
    /// round-trip guarantee on itself.
    pub fn archive(&self, tree_id: &ObjectHash) -> Result<Vec<u8>, MemovError> {
        let tree: Tree = self.read_object(tree_id)?;
        let mut builder = tar::Builder::new(Vec::new());
        self.append_tree_to_archive(&mut builder, &tree, Path::new(""))?;
        builder
            .into_inner()
            .map_err(|e| MemovError::Store(GitError::CustomError(format!("can't finish archive: {e}"))))
    }

    fn append_tree_to_archive(
        &self,
        builder: &mut tar::Builder<Vec<u8>>,
        tree: &Tree,
        prefix: &Path,
    ) -> Result<(), MemovError> {
        for entry in &tree.entries {
            let path = prefix.join(&entry.name);
            match entry.mode {
                EntryMode::Blob => {
                    let blob: Blob = self.read_object(&entry.id)?;
                    let mut header = tar::Header::new_gnu();
                    header.set_size(blob.data.len() as u64);
                    header.set_mode(0o644);
                    header.set_cksum();
                    builder.append_data(&mut header, &path, blob.data.as_slice())?;
                }
                EntryMode::Tree => {
                    let subtree: Tree = self.read_object(&entry.id)?;
                    self.append_tree_to_archive(builder, &subtree, &path)?;
                }
            }
        }
        Ok(())
    }
}
