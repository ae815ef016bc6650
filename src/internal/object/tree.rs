//! Tree objects: an ordered directory listing mapping entry names to blob or
//! sub-tree hashes, serialized in Git's own binary tree format so a tree's
//! id is a pure function of its (name, mode, hash) set.

use std::fmt::Display;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::errors::GitError;
use crate::hash::ObjectHash;
use crate::internal::object::ObjectTrait;
use crate::internal::object::ObjectType;

/// The kind of object a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Decode, Encode)]
pub enum EntryMode {
    Blob,
    Tree,
}

impl EntryMode {
    fn as_bytes(&self) -> &'static [u8] {
        match self {
            EntryMode::Blob => b"100644",
            EntryMode::Tree => b"40000",
        }
    }

    fn from_bytes(mode: &[u8]) -> Result<EntryMode, GitError> {
        match mode {
            b"100644" | b"100755" => Ok(EntryMode::Blob),
            b"40000" => Ok(EntryMode::Tree),
            other => Err(GitError::InvalidTreeItem(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }
}

/// A single named entry in a tree: a file (`Blob`) or a subdirectory
/// (`Tree`), plus the hash of the object it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Decode, Encode)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: String,
    pub id: ObjectHash,
}

impl TreeEntry {
    pub fn new(mode: EntryMode, name: impl Into<String>, id: ObjectHash) -> TreeEntry {
        TreeEntry {
            mode,
            name: name.into(),
            id,
        }
    }
}

/// A directory snapshot: a sorted list of entries. Two trees with the same
/// entries (by name, mode, and target hash) always serialize to the same
/// bytes and therefore hash identically, regardless of the order entries
/// were added in.
#[derive(Eq, Debug, Clone, Serialize, Deserialize, Decode, Encode)]
pub struct Tree {
    pub id: ObjectHash,
    pub entries: Vec<TreeEntry>,
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for entry in &self.entries {
            writeln!(
                f,
                "{} {:?} {}\t{}",
                String::from_utf8_lossy(entry.mode.as_bytes()),
                entry.mode,
                entry.id,
                entry.name
            )?;
        }
        Ok(())
    }
}

impl Tree {
    /// Builds a tree from an unordered entry list, canonicalizing the order
    /// by byte-sorting on entry name before computing the id.
    pub fn new(mut entries: Vec<TreeEntry>) -> Tree {
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        let mut tree = Tree {
            id: ObjectHash::default(),
            entries,
        };
        let data = tree.to_data().unwrap();
        tree.id = ObjectHash::from_type_and_data(ObjectType::Tree, &data);
        tree
    }

    pub fn find(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

impl ObjectTrait for Tree {
    fn from_bytes(data: &[u8], hash: ObjectHash) -> Result<Self, GitError>
    where
        Self: Sized,
    {
        let mut entries = Vec::new();
        let mut cursor = data;
        while !cursor.is_empty() {
            let space = cursor
                .iter()
                .position(|&b| b == b' ')
                .ok_or(GitError::InvalidTreeObject)?;
            let mode = EntryMode::from_bytes(&cursor[..space])?;

            let nul = cursor
                .iter()
                .position(|&b| b == 0)
                .ok_or(GitError::InvalidTreeObject)?;
            let name = String::from_utf8(cursor[space + 1..nul].to_vec())
                .map_err(|e| GitError::ConversionError(e.to_string()))?;

            let hash_len = hash.size();
            let hash_start = nul + 1;
            let hash_end = hash_start + hash_len;
            if cursor.len() < hash_end {
                return Err(GitError::InvalidTreeObject);
            }
            let entry_id = ObjectHash::from_bytes(&cursor[hash_start..hash_end])
                .map_err(GitError::InvalidHashValue)?;

            entries.push(TreeEntry::new(mode, name, entry_id));
            cursor = &cursor[hash_end..];
        }

        if entries.is_empty() && !data.is_empty() {
            return Err(GitError::EmptyTreeItems(
                "tree data present but no entries parsed".to_string(),
            ));
        }

        Ok(Tree { id: hash, entries })
    }

    fn get_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn get_size(&self) -> usize {
        self.entries.len()
    }

    fn to_data(&self) -> Result<Vec<u8>, GitError> {
        let mut data = Vec::new();
        let mut sorted: Vec<&TreeEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        for entry in sorted {
            data.extend(entry.mode.as_bytes());
            data.push(b' ');
            data.extend(entry.name.as_bytes());
            data.push(0);
            data.extend(entry.id.as_ref());
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{HashKind, set_hash_kind_for_test};

    #[test]
    fn test_insertion_order_does_not_affect_hash() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let blob_a = ObjectHash::from_type_and_data(ObjectType::Blob, b"a");
        let blob_b = ObjectHash::from_type_and_data(ObjectType::Blob, b"b");

        let t1 = Tree::new(vec![
            TreeEntry::new(EntryMode::Blob, "a.txt", blob_a),
            TreeEntry::new(EntryMode::Blob, "b.txt", blob_b),
        ]);
        let t2 = Tree::new(vec![
            TreeEntry::new(EntryMode::Blob, "b.txt", blob_b),
            TreeEntry::new(EntryMode::Blob, "a.txt", blob_a),
        ]);
        assert_eq!(t1.id, t2.id);
    }

    #[test]
    fn test_from_bytes_round_trip() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let blob_a = ObjectHash::from_type_and_data(ObjectType::Blob, b"a");
        let tree = Tree::new(vec![TreeEntry::new(EntryMode::Blob, "a.txt", blob_a)]);
        let data = tree.to_data().unwrap();
        let parsed = Tree::from_bytes(&data, tree.id).unwrap();
        assert_eq!(parsed.entries, tree.entries);
        assert_eq!(parsed.find("a.txt").unwrap().id, blob_a);
    }

    #[test]
    fn test_empty_tree() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let tree = Tree::new(vec![]);
        assert!(tree.entries.is_empty());
        let data = tree.to_data().unwrap();
        assert!(data.is_empty());
    }
}
