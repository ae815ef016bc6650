//! Component E: the Snapshot Engine.
//!
//! `track`/`snapshot_all`/`snapshot` (partial) follow the original
//! manager's track/snapshot/commit sequence: a file only enters a tree
//! once it has been explicitly tracked, and a *partial* snapshot re-reads
//! content only for the paths it names: every other tracked path is
//! inherited byte-for-byte from HEAD's tree, even if it changed on disk
//! since the last snapshot ("no accidental capture").

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::MemovConfig;
use crate::error::MemovError;
use crate::hash::ObjectHash;
use crate::ignore::IgnoreMatcher;
use crate::internal::object::ObjectTrait;
use crate::internal::object::blob::Blob;
use crate::internal::object::commit::{Commit, MemovMessage};
use crate::internal::object::tree::{EntryMode, Tree, TreeEntry};
use crate::internal::object::types::CommitSource;
use crate::refs::RefCatalog;
use crate::store::ObjectStore;

/// The set of paths ever explicitly tracked, persisted at `.mem/tracked.json`.
///
/// Tracking a path is what makes `snapshot_all` consider it; it is the
/// memov analogue of `git add` for a brand-new file, except the tracked
/// set, once established, also governs every later `snapshot_all` without
/// needing to be repeated.
struct TrackedSet {
    path: PathBuf,
    paths: std::collections::BTreeSet<PathBuf>,
}

impl TrackedSet {
    fn load(mem_dir: &Path) -> Result<TrackedSet, MemovError> {
        let path = mem_dir.join("tracked.json");
        let paths = if path.is_file() {
            let text = std::fs::read_to_string(&path)?;
            serde_json::from_str(&text)
                .map_err(|e| MemovError::Unknown(format!("invalid tracked.json: {e}")))?
        } else {
            std::collections::BTreeSet::new()
        };
        Ok(TrackedSet { path, paths })
    }

    fn save(&self) -> Result<(), MemovError> {
        let text = serde_json::to_string_pretty(&self.paths)
            .map_err(|e| MemovError::Unknown(format!("can't serialize tracked.json: {e}")))?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    fn add(&mut self, path: PathBuf) -> Result<(), MemovError> {
        if self.paths.insert(path) {
            self.save()?;
        }
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<(), MemovError> {
        if self.paths.remove(path) {
            self.save()?;
        }
        Ok(())
    }
}

/// Orchestrates reads of the working copy and writes to the object store
/// and ref catalog to produce new commits.
pub struct SnapshotEngine {
    root: PathBuf,
    store: ObjectStore,
    refs: RefCatalog,
    ignore: IgnoreMatcher,
    tracked: TrackedSet,
    config: MemovConfig,
}

impl SnapshotEngine {
    pub fn open(root: PathBuf, mem_dir: &Path, config: MemovConfig) -> Result<SnapshotEngine, MemovError> {
        Ok(SnapshotEngine {
            store: ObjectStore::open(mem_dir)?,
            refs: RefCatalog::open(mem_dir)?,
            ignore: IgnoreMatcher::load(&root)?,
            tracked: TrackedSet::load(mem_dir)?,
            config,
            root,
        })
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn refs(&self) -> &RefCatalog {
        &self.refs
    }

    /// Flattens HEAD's tree, if any, into `relative path -> blob hash`.
    fn head_entries(&self) -> Result<BTreeMap<PathBuf, ObjectHash>, MemovError> {
        let mut entries = BTreeMap::new();
        if let Some(tree) = self.head_tree()? {
            crate::scanner::flatten_tree(&self.store, &tree, Path::new(""), &mut entries)?;
        }
        Ok(entries)
    }

    /// Resolves HEAD's commit to its tree object, or `None` for a project
    /// with no commits yet.
    pub fn head_tree(&self) -> Result<Option<Tree>, MemovError> {
        match self.refs.head_commit() {
            Some(commit_id) => {
                let commit: Commit = self.store.read_object(&commit_id)?;
                Ok(Some(self.store.read_object(&commit.tree_id)?))
            }
            None => Ok(None),
        }
    }

    /// Classifies the working copy against HEAD, for callers that need to
    /// know what changed before deciding what to commit.
    pub fn scan(&self) -> Result<crate::scanner::ScanResult, MemovError> {
        let tree = self.head_tree()?;
        crate::scanner::scan(&self.root, &self.ignore, &self.store, tree.as_ref())
    }

    fn build_tree(&self, entries: &BTreeMap<PathBuf, ObjectHash>) -> Result<Tree, MemovError> {
        let mut top_blobs: BTreeMap<String, ObjectHash> = BTreeMap::new();
        let mut top_dirs: BTreeMap<String, BTreeMap<PathBuf, ObjectHash>> = BTreeMap::new();

        for (path, hash) in entries {
            let mut components = path.components();
            let first = components
                .next()
                .ok_or_else(|| MemovError::Unknown("empty path in tree".to_string()))?
                .as_os_str()
                .to_string_lossy()
                .to_string();
            let rest: PathBuf = components.collect();
            if rest.as_os_str().is_empty() {
                top_blobs.insert(first, *hash);
            } else {
                top_dirs.entry(first).or_default().insert(rest, *hash);
            }
        }

        let mut tree_entries = Vec::new();
        for (name, hash) in top_blobs {
            tree_entries.push(TreeEntry::new(EntryMode::Blob, name, hash));
        }
        for (name, sub_entries) in top_dirs {
            let subtree = self.build_tree(&sub_entries)?;
            let subtree_hash = self.store.write_object(&subtree)?;
            tree_entries.push(TreeEntry::new(EntryMode::Tree, name, subtree_hash));
        }
        Ok(Tree::new(tree_entries))
    }

    fn write_commit(
        &mut self,
        entries: BTreeMap<PathBuf, ObjectHash>,
        body: &MemovMessage,
    ) -> Result<ObjectHash, MemovError> {
        let tree = self.build_tree(&entries)?;
        let tree_id = self.store.write_object(&tree)?;

        let parents = match self.refs.head_commit() {
            Some(parent) => vec![parent],
            None => vec![],
        };
        let commit = Commit::from_tree_id(
            tree_id,
            parents,
            &body.to_body(),
            (&self.config.identity.name, &self.config.identity.email),
        );
        let commit_id = self.store.write_object(&commit)?;
        self.refs.advance(commit_id)?;
        info!(commit = %commit_id, files = body.files.len(), "wrote commit");
        Ok(commit_id)
    }

    /// Tracks `paths` (files or directories, directories expanded
    /// recursively and ignored entries skipped) and produces exactly one
    /// commit. A path already tracked at HEAD keeps its existing blob id
    /// untouched rather than being rehashed, so re-tracking it never
    /// captures a concurrent manual edit to content this call doesn't
    /// otherwise name; a genuinely new path gets a fresh blob. Advances
    /// refs atomically via `write_commit`.
    pub fn track(
        &mut self,
        paths: &[PathBuf],
        source: CommitSource,
        prompt: Option<String>,
        response: Option<String>,
    ) -> Result<ObjectHash, MemovError> {
        let head = self.head_entries()?;

        let mut expanded = Vec::new();
        for path in paths {
            let abs = self.root.join(path);
            if abs.is_dir() {
                crate::scanner::walk_files(&abs, &self.root, &self.ignore, &mut expanded)?;
            } else if abs.is_file() {
                expanded.push(path.clone());
            } else {
                return Err(MemovError::FileNotTracked(path.display().to_string()));
            }
        }

        let mut entries = head.clone();
        let mut new_files = Vec::new();
        for path in expanded {
            let abs = self.root.join(&path);
            if self.ignore.is_ignored(&abs, false) {
                continue;
            }
            if head.contains_key(&path) {
                self.tracked.add(path)?;
                continue;
            }
            let content = std::fs::read(&abs)?;
            let blob = Blob::new(content);
            let hash = self.store.write_object(&blob)?;
            entries.insert(path.clone(), hash);
            self.tracked.add(path.clone())?;
            new_files.push(path.display().to_string());
        }

        let body = MemovMessage {
            summary: "track".to_string(),
            files: new_files,
            prompt,
            response,
            plan: None,
            source,
        };
        self.write_commit(entries, &body)
    }

    /// Snapshots every tracked path's current content, dropping any
    /// tracked path that no longer exists on disk (a silent `remove`).
    pub fn snapshot_all(
        &mut self,
        message: &str,
        source: CommitSource,
        prompt: Option<String>,
        response: Option<String>,
        plan: Option<String>,
    ) -> Result<ObjectHash, MemovError> {
        let mut entries = BTreeMap::new();
        let mut files = Vec::new();
        let tracked_paths: Vec<PathBuf> = self.tracked.paths.iter().cloned().collect();
        for path in &tracked_paths {
            let abs = self.root.join(path);
            if abs.is_file() {
                let content = std::fs::read(&abs)?;
                let blob = Blob::new(content);
                let hash = self.store.write_object(&blob)?;
                entries.insert(path.clone(), hash);
                files.push(path.display().to_string());
            } else {
                self.tracked.remove(path)?;
            }
        }

        let body = MemovMessage {
            summary: message.to_string(),
            files,
            prompt,
            response,
            plan,
            source,
        };
        self.write_commit(entries, &body)
    }

    /// Snapshots only the named paths; every other tracked path is
    /// inherited verbatim from HEAD's tree. A path unreadable from disk at
    /// commit time silently falls back to whatever HEAD already recorded
    /// for it (or is omitted if HEAD never tracked it), rather than
    /// failing the whole snapshot.
    pub fn snapshot(
        &mut self,
        paths: &[PathBuf],
        message: &str,
        source: CommitSource,
        prompt: Option<String>,
        response: Option<String>,
        plan: Option<String>,
    ) -> Result<ObjectHash, MemovError> {
        let mut entries = self.head_entries()?;
        let mut files = Vec::new();

        for path in paths {
            self.tracked.add(path.clone())?;
            let abs = self.root.join(path);
            match std::fs::read(&abs) {
                Ok(content) => {
                    let blob = Blob::new(content);
                    let hash = self.store.write_object(&blob)?;
                    entries.insert(path.clone(), hash);
                    files.push(path.display().to_string());
                }
                Err(_) => {
                    files.push(path.display().to_string());
                }
            }
        }

        let body = MemovMessage {
            summary: message.to_string(),
            files,
            prompt,
            response,
            plan,
            source,
        };
        self.write_commit(entries, &body)
    }

    /// Records a rename as a single commit: the old path is dropped and
    /// the new path takes over its blob hash unchanged. Implemented as one
    /// commit carrying both the removal and the addition rather than two
    /// separate commits; a future revision may want to split rename into
    /// an explicit remove-commit followed by an add-commit so history
    /// shows the intermediate state, but nothing downstream needs that
    /// split today.
    pub fn record_rename(
        &mut self,
        from: &Path,
        to: &Path,
        message: &str,
        source: CommitSource,
    ) -> Result<ObjectHash, MemovError> {
        let mut entries = self.head_entries()?;
        let hash = entries
            .remove(from)
            .ok_or_else(|| MemovError::FileNotTracked(from.display().to_string()))?;
        entries.insert(to.to_path_buf(), hash);
        self.tracked.remove(from)?;
        self.tracked.add(to.to_path_buf())?;

        let body = MemovMessage {
            summary: message.to_string(),
            files: vec![
                format!("{} -> {}", from.display(), to.display()),
            ],
            prompt: None,
            response: None,
            plan: None,
            source,
        };
        self.write_commit(entries, &body)
    }

    /// Records removal of a tracked path.
    pub fn record_remove(
        &mut self,
        path: &Path,
        message: &str,
        source: CommitSource,
    ) -> Result<ObjectHash, MemovError> {
        let mut entries = self.head_entries()?;
        entries
            .remove(path)
            .ok_or_else(|| MemovError::FileNotTracked(path.display().to_string()))?;
        self.tracked.remove(path)?;

        let body = MemovMessage {
            summary: message.to_string(),
            files: vec![path.display().to_string()],
            prompt: None,
            response: None,
            plan: None,
            source,
        };
        self.write_commit(entries, &body)
    }
}
