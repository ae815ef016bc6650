//! Component D: the Workspace Scanner.
//!
//! Classifies every file under a project root into untracked / modified /
//! deleted / unchanged by comparing the blob hash of its *current content*
//! against the blob hash recorded for that path in HEAD's tree, never by
//! mtime, which is unreliable across filesystems and trivially defeated by
//! a `touch`. Grounded on the original manager's scan step, and
//! cross-checked against the blob-OID tree comparison technique used to
//! detect which paths a commit touched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::MemovError;
use crate::hash::ObjectHash;
use crate::ignore::IgnoreMatcher;
use crate::internal::object::ObjectTrait;
use crate::internal::object::tree::{EntryMode, Tree};
use crate::internal::object::types::ObjectType;
use crate::store::ObjectStore;

/// The result of comparing the working copy against HEAD's tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub untracked: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

/// Recursively resolves a tree into a flat `relative path -> blob hash` map.
pub fn flatten_tree(
    store: &ObjectStore,
    tree: &Tree,
    prefix: &Path,
    out: &mut BTreeMap<PathBuf, ObjectHash>,
) -> Result<(), MemovError> {
    for entry in &tree.entries {
        let path = prefix.join(&entry.name);
        match entry.mode {
            EntryMode::Blob => {
                out.insert(path, entry.id);
            }
            EntryMode::Tree => {
                let subtree: Tree = store.read_object(&entry.id)?;
                flatten_tree(store, &subtree, &path, out)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn walk_files(
    dir: &Path,
    root: &Path,
    ignore: &IgnoreMatcher,
    out: &mut Vec<PathBuf>,
) -> Result<(), MemovError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if ignore.is_ignored(&path, file_type.is_dir()) {
            continue;
        }
        if file_type.is_dir() {
            walk_files(&path, root, ignore, out)?;
        } else if file_type.is_file() {
            out.push(path.strip_prefix(root).unwrap_or(&path).to_path_buf());
        }
    }
    Ok(())
}

/// Scans `project_root`, comparing against `head_tree` (`None` for a
/// project with no commits yet, in which case every tracked-eligible file
/// is untracked).
pub fn scan(
    project_root: &Path,
    ignore: &IgnoreMatcher,
    store: &ObjectStore,
    head_tree: Option<&Tree>,
) -> Result<ScanResult, MemovError> {
    let mut tracked = BTreeMap::new();
    if let Some(tree) = head_tree {
        flatten_tree(store, tree, Path::new(""), &mut tracked)?;
    }

    let mut working_paths = Vec::new();
    walk_files(project_root, project_root, ignore, &mut working_paths)?;
    let working_set: std::collections::BTreeSet<PathBuf> =
        working_paths.iter().cloned().collect();

    let mut result = ScanResult::default();
    for path in &working_paths {
        let content = std::fs::read(project_root.join(path))?;
        let current_hash = ObjectHash::from_type_and_data(ObjectType::Blob, &content);
        match tracked.get(path) {
            None => result.untracked.push(path.clone()),
            Some(head_hash) if *head_hash == current_hash => result.unchanged.push(path.clone()),
            Some(_) => result.modified.push(path.clone()),
        }
    }

    for path in tracked.keys() {
        if !working_set.contains(path) {
            result.deleted.push(path.clone());
        }
    }

    Ok(result)
}
