//! Component J: History Views.
//!
//! `history()` walks the commit chain from a branch tip back to the root;
//! `show()` resolves a single commit to its parsed message and tree;
//! `jump()` checks the working copy out at an arbitrary past commit. A
//! commit with a note attached displays the note's content in place of its
//! own message summary: the note is assumed to be a human's later, more
//! accurate account of what a commit did.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MemovError;
use crate::hash::ObjectHash;
use crate::internal::object::ObjectTrait;
use crate::internal::object::commit::{Commit, MemovMessage};
use crate::internal::object::note::Note;
use crate::internal::object::tree::Tree;
use crate::refs::RefCatalog;
use crate::store::ObjectStore;

/// Maps commit id -> attached note id, persisted at `.mem/notes.json`. The
/// note's content itself lives in the object store like any other blob;
/// this catalog only tracks which commit it annotates, since notes are
/// mutable (a later `annotate` call replaces the mapping) while objects
/// themselves never change once written.
pub struct NoteCatalog {
    path: std::path::PathBuf,
    notes: BTreeMap<String, ObjectHash>,
}

impl NoteCatalog {
    pub fn open(mem_dir: &Path) -> Result<NoteCatalog, MemovError> {
        let path = mem_dir.join("notes.json");
        let notes = if path.is_file() {
            let text = std::fs::read_to_string(&path)?;
            let raw: BTreeMap<String, String> = serde_json::from_str(&text)
                .map_err(|e| MemovError::Unknown(format!("invalid notes.json: {e}")))?;
            raw.into_iter()
                .map(|(commit, note)| {
                    ObjectHash::from_str(&note)
                        .map(|hash| (commit, hash))
                        .map_err(|e: String| MemovError::Unknown(format!("invalid note hash: {e}")))
                })
                .collect::<Result<_, _>>()?
        } else {
            BTreeMap::new()
        };
        Ok(NoteCatalog { path, notes })
    }

    fn save(&self) -> Result<(), MemovError> {
        let raw: BTreeMap<String, String> = self
            .notes
            .iter()
            .map(|(commit, hash)| (commit.clone(), hash.to_string()))
            .collect();
        let text = serde_json::to_string_pretty(&raw)
            .map_err(|e| MemovError::Unknown(format!("can't serialize notes.json: {e}")))?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    /// Attaches (or replaces) a note on `commit_id`, writing the note's
    /// content to the object store.
    pub fn annotate(
        &mut self,
        store: &ObjectStore,
        commit_id: ObjectHash,
        content: &str,
    ) -> Result<(), MemovError> {
        let note = Note::new(commit_id, content.to_string());
        let note_id = store.write_object(&note)?;
        self.notes.insert(commit_id.to_string(), note_id);
        self.save()
    }

    pub fn get(&self, store: &ObjectStore, commit_id: &ObjectHash) -> Result<Option<Note>, MemovError> {
        match self.notes.get(&commit_id.to_string()) {
            Some(note_id) => Ok(Some(store.read_object(note_id)?)),
            None => Ok(None),
        }
    }
}

/// One entry in a `history()` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub commit_id: String,
    pub summary: String,
    pub source: crate::internal::object::types::CommitSource,
    pub timestamp: i64,
}

/// Full detail for a single commit, as returned by `show()`.
pub struct ShowResult {
    pub commit: Commit,
    pub message: MemovMessage,
    /// The note's content, if one is attached, displayed instead of the
    /// commit's own message summary.
    pub display_summary: String,
    pub tree: Tree,
}

/// Walks the commit chain from `branch`'s tip (or HEAD if `None`) back to
/// the root, newest first.
pub fn history(
    store: &ObjectStore,
    refs: &RefCatalog,
    notes: &NoteCatalog,
    branch: Option<&str>,
) -> Result<Vec<HistoryEntry>, MemovError> {
    let mut current = match branch {
        Some(name) => refs.branch_commit(name),
        None => refs.head_commit(),
    };

    let mut entries = Vec::new();
    while let Some(commit_id) = current {
        let commit: Commit = store.read_object(&commit_id)?;
        let message = MemovMessage::parse(&commit.message);
        let display_summary = match notes.get(store, &commit_id)? {
            Some(note) => note.content,
            None => message.summary.clone(),
        };
        entries.push(HistoryEntry {
            commit_id: commit_id.to_string(),
            summary: display_summary,
            source: message.source,
            timestamp: commit.committer.timestamp,
        });
        current = commit.parent_commit_ids.first().copied();
    }
    Ok(entries)
}

/// Resolves a single commit to its full detail.
pub fn show(store: &ObjectStore, notes: &NoteCatalog, commit_id: ObjectHash) -> Result<ShowResult, MemovError> {
    let commit: Commit = store.read_object(&commit_id)?;
    let tree: Tree = store.read_object(&commit.tree_id)?;
    let message = MemovMessage::parse(&commit.message);
    let display_summary = match notes.get(store, &commit_id)? {
        Some(note) => note.content,
        None => message.summary.clone(),
    };
    Ok(ShowResult {
        commit,
        message,
        display_summary,
        tree,
    })
}

/// Checks the working copy out at `commit_id`: every path ever tracked on
/// any branch but absent from the target commit's tree is deleted, then
/// the target tree's own content is extracted into `root`. Head ends up
/// detached at `commit_id`; a later commit from here lands on whichever
/// branch `RefCatalog::advance` decides it continues, or a fresh
/// `develop/<N>` if it continues none of them.
///
/// Not a merge: uncommitted local changes to a tracked path are
/// overwritten without warning, same as the target tree's own version of
/// that path would be.
pub fn jump(
    store: &ObjectStore,
    refs: &mut RefCatalog,
    root: &Path,
    commit_id: ObjectHash,
) -> Result<(), MemovError> {
    let mut ever_tracked: BTreeMap<std::path::PathBuf, ObjectHash> = BTreeMap::new();
    for (_, tip) in refs.branches() {
        let commit: Commit = store.read_object(&tip)?;
        let tree: Tree = store.read_object(&commit.tree_id)?;
        crate::scanner::flatten_tree(store, &tree, Path::new(""), &mut ever_tracked)?;
    }

    let target_commit: Commit = store.read_object(&commit_id)?;
    let target_tree: Tree = store.read_object(&target_commit.tree_id)?;
    let mut target_entries = BTreeMap::new();
    crate::scanner::flatten_tree(store, &target_tree, Path::new(""), &mut target_entries)?;

    for path in ever_tracked.keys() {
        if !target_entries.contains_key(path) {
            let abs = root.join(path);
            if abs.is_file() {
                std::fs::remove_file(&abs)?;
            }
        }
    }

    let archive_bytes = store.archive(&target_commit.tree_id)?;
    let mut archive = tar::Archive::new(archive_bytes.as_slice());
    archive.unpack(root)?;

    refs.checkout_detached(commit_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemovConfig;
    use crate::hash::{HashKind, set_hash_kind_for_test};
    use crate::internal::object::types::CommitSource;
    use crate::snapshot::SnapshotEngine;
    use std::path::PathBuf;

    fn setup(dir: &Path) -> SnapshotEngine {
        let mem_dir = dir.join(".mem");
        std::fs::create_dir_all(&mem_dir).unwrap();
        ObjectStore::init(&mem_dir).unwrap();
        RefCatalog::init(&mem_dir).unwrap();
        SnapshotEngine::open(dir.to_path_buf(), &mem_dir, MemovConfig::default()).unwrap()
    }

    #[test]
    fn test_history_lists_newest_first() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "one").unwrap();
        let mut engine = setup(dir.path());
        engine
            .track(&[PathBuf::from("a.txt")], CommitSource::User, None, None)
            .unwrap();
        engine.snapshot_all("first", CommitSource::User, None, None, None).unwrap();

        std::fs::write(dir.path().join("a.txt"), "two").unwrap();
        engine.snapshot_all("second", CommitSource::User, None, None, None).unwrap();

        let notes = NoteCatalog::open(&dir.path().join(".mem")).unwrap();
        let entries = history(engine.store(), engine.refs(), &notes, None).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].summary, "second");
        assert_eq!(entries[1].summary, "first");
    }

    #[test]
    fn test_note_overrides_message_in_display() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "one").unwrap();
        let mut engine = setup(dir.path());
        engine
            .track(&[PathBuf::from("a.txt")], CommitSource::User, None, None)
            .unwrap();
        let commit_id = engine
            .snapshot_all("raw summary", CommitSource::User, None, None, None)
            .unwrap();

        let mem_dir = dir.path().join(".mem");
        let mut notes = NoteCatalog::open(&mem_dir).unwrap();
        notes.annotate(engine.store(), commit_id, "human-authored note").unwrap();

        let result = show(engine.store(), &notes, commit_id).unwrap();
        assert_eq!(result.display_summary, "human-authored note");
        assert_eq!(result.message.summary, "raw summary");
    }

    #[test]
    fn test_jump_detaches_head_and_restores_workspace() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "one").unwrap();
        let mut engine = setup(dir.path());
        engine
            .track(&[PathBuf::from("a.txt")], CommitSource::User, None, None)
            .unwrap();
        let c1 = engine.snapshot_all("first", CommitSource::User, None, None, None).unwrap();

        std::fs::write(dir.path().join("a.txt"), "two").unwrap();
        std::fs::write(dir.path().join("b.txt"), "added after c1").unwrap();
        engine
            .track(&[PathBuf::from("b.txt")], CommitSource::User, None, None)
            .unwrap();
        engine.snapshot_all("second", CommitSource::User, None, None, None).unwrap();

        let mem_dir = dir.path().join(".mem");
        let mut refs = RefCatalog::open(&mem_dir).unwrap();
        jump(engine.store(), &mut refs, dir.path(), c1).unwrap();
        assert_eq!(refs.current_branch(), None);
        assert_eq!(refs.head_commit(), Some(c1));

        // b.txt didn't exist at c1, so jumping back to c1 must delete it.
        assert!(!dir.path().join("b.txt").is_file());
        // a.txt's content is restored to what c1 recorded, overwriting the
        // edit made after it.
        let content = std::fs::read_to_string(dir.path().join("a.txt")).unwrap();
        assert_eq!(content, "one");
    }

    /// Scenario S5: recording after a jump to a non-tip commit never moves
    /// `main`, the new commit lands on a freshly allocated branch instead.
    #[test]
    fn test_s5_record_after_jump_allocates_develop_branch() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "one").unwrap();
        let mut engine = setup(dir.path());
        engine
            .track(&[PathBuf::from("a.txt")], CommitSource::User, None, None)
            .unwrap();
        let h0 = engine.snapshot_all("h0", CommitSource::User, None, None, None).unwrap();
        std::fs::write(dir.path().join("a.txt"), "two").unwrap();
        engine.snapshot_all("h1", CommitSource::User, None, None, None).unwrap();
        std::fs::write(dir.path().join("a.txt"), "three").unwrap();
        let h2 = engine.snapshot_all("h2", CommitSource::User, None, None, None).unwrap();

        let mem_dir = dir.path().join(".mem");
        let mut refs = RefCatalog::open(&mem_dir).unwrap();
        jump(engine.store(), &mut refs, dir.path(), h0).unwrap();
        drop(refs);

        std::fs::write(dir.path().join("x.txt"), "from develop").unwrap();
        let mut engine2 = SnapshotEngine::open(dir.path().to_path_buf(), &mem_dir, MemovConfig::default()).unwrap();
        let j1 = engine2
            .track(&[PathBuf::from("x.txt")], CommitSource::User, None, None)
            .unwrap();

        assert_eq!(engine2.refs().current_branch(), Some("develop/0"));
        assert_eq!(engine2.refs().branch_commit("develop/0"), Some(j1));
        assert_eq!(engine2.refs().branch_commit("main"), Some(h2));
    }
}
