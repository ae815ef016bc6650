//! Component I: the Interaction Recorder.
//!
//! `record()` is the crate's main entry point for AI-assisted edits. It
//! calls the Snapshot Engine in-process; it never shells out to a CLI,
//! unlike the original's MCP server, which drove snapshots by invoking a
//! separate process.
//!
//! The eight steps of `record`:
//!
//! 1. Validate every named path resolves inside the project root.
//! 2. If no object store exists yet at `root` (first interaction in a
//!    fresh directory), bootstrap one: create `.mem`, initialize the
//!    store and ref catalog, write an empty `.memignore`, and track it.
//!    This step runs once, in `Recorder::open`, before a `Recorder` value
//!    can exist at all.
//! 3. If `files_changed` is empty, do nothing: a prompt-only interaction
//!    with no associated edits never touches history.
//! 4. Otherwise scan the workspace against HEAD.
//! 5. Resolve `files_changed` against the scan to get the AI's file set.
//! 6. Any modified file *outside* that set is a manual edit made before
//!    the interaction started; commit it first under `CommitSource::User`
//!    so an AI commit never silently absorbs it.
//! 7. Partition the AI's file set into newly-untracked and
//!    already-tracked-but-modified; issue a `track` commit for the former
//!    (if any) and a partial-snapshot commit for the latter (if any),
//!    both under `CommitSource::Ai`. Commit order is always manual, then
//!    track, then AI-snapshot.
//! 8. Each commit enqueues its prompt/response/plan text onto the
//!    Pending-Writes Queue, tagged with that commit's id; `sync_pending`
//!    later drains the queue into the Vector Store.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::MemovConfig;
use crate::error::MemovError;
use crate::hash::ObjectHash;
use crate::internal::object::types::CommitSource;
use crate::pending::{PendingWrite, PendingWrites};
use crate::refs::RefCatalog;
use crate::snapshot::SnapshotEngine;
use crate::store::ObjectStore;
use crate::vectordb::{EmbeddingBackend, Role, VectorStore};

fn validate_within_root(root: &Path, path: &Path) -> Result<(), MemovError> {
    if path.is_absolute() {
        return Err(MemovError::PathOutsideProject(path.display().to_string()));
    }
    if path.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
        return Err(MemovError::PathOutsideProject(path.display().to_string()));
    }
    let _ = root;
    Ok(())
}

/// Ties together the Snapshot Engine, Pending-Writes Queue, and Vector
/// Store behind the single `record()` call an AI-assisted editing session
/// drives.
pub struct Recorder {
    root: PathBuf,
    engine: SnapshotEngine,
    pending: PendingWrites,
    vectordb: VectorStore,
    config: MemovConfig,
}

impl Recorder {
    pub fn open(root: PathBuf, mem_dir: &Path, config: MemovConfig) -> Result<Recorder, MemovError> {
        if !mem_dir.join("memov.git").join("objects").is_dir() {
            Self::bootstrap(&root, mem_dir, &config)?;
        }
        Ok(Recorder {
            engine: SnapshotEngine::open(root.clone(), mem_dir, config.clone())?,
            pending: PendingWrites::new(),
            vectordb: VectorStore::open(mem_dir)?,
            config,
            root,
        })
    }

    /// Creates `.mem` and its object store, writes an initial `.memignore`
    /// if the project doesn't already have one, and tracks it as the
    /// project's first commit. Runs once, the first time a `Recorder` is
    /// opened against a path with no memov store yet.
    fn bootstrap(root: &Path, mem_dir: &Path, config: &MemovConfig) -> Result<(), MemovError> {
        std::fs::create_dir_all(mem_dir)?;
        ObjectStore::init(mem_dir)?;
        RefCatalog::init(mem_dir)?;
        std::fs::create_dir_all(mem_dir.join("logs"))?;
        std::fs::create_dir_all(mem_dir.join("vectordb"))?;
        config.save(mem_dir)?;

        let memignore = root.join(".memignore");
        if !memignore.is_file() {
            std::fs::write(&memignore, "")?;
        }

        let mut engine = SnapshotEngine::open(root.to_path_buf(), mem_dir, config.clone())?;
        engine.track(
            &[PathBuf::from(".memignore")],
            CommitSource::User,
            None,
            None,
        )?;
        info!(root = %root.display(), "bootstrapped new memov store");
        Ok(())
    }

    pub fn engine(&self) -> &SnapshotEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SnapshotEngine {
        &mut self.engine
    }

    pub fn pending_count(&self) -> usize {
        self.pending.count()
    }

    /// Pushes one commit's prompt/response/plan onto the Pending-Writes
    /// Queue, split by role as the store expects.
    fn enqueue(
        &mut self,
        commit_id: ObjectHash,
        prompt: &str,
        response: &str,
        plan: Option<&str>,
        files: &[String],
        source: CommitSource,
    ) {
        self.pending.push(PendingWrite {
            commit_id,
            role: Role::Prompt,
            text: prompt.to_string(),
            files: files.to_vec(),
            source,
        });
        self.pending.push(PendingWrite {
            commit_id,
            role: Role::Response,
            text: response.to_string(),
            files: files.to_vec(),
            source,
        });
        if let Some(plan) = plan {
            self.pending.push(PendingWrite {
                commit_id,
                role: Role::Plan,
                text: plan.to_string(),
                files: files.to_vec(),
                source,
            });
        }
    }

    /// Records one AI-assisted interaction. Returns `None` if
    /// `files_changed` is empty, a prompt-only interaction never touches
    /// history. Otherwise issues, in order:
    ///
    /// 1. a manual-edit commit (`CommitSource::User`) over every modified
    ///    file the AI's file set doesn't name, if any;
    /// 2. a `track` commit (`CommitSource::Ai`) over the AI's file set
    ///    restricted to paths not yet tracked, if any;
    /// 3. a partial-snapshot commit (`CommitSource::Ai`) over the rest of
    ///    the AI's file set, if any.
    ///
    /// and returns the id of the last commit issued. Each commit enqueues
    /// its own prompt/response/plan text for `sync_pending` to index.
    pub fn record(
        &mut self,
        files: &[PathBuf],
        prompt: &str,
        response: &str,
        plan: Option<&str>,
    ) -> Result<Option<ObjectHash>, MemovError> {
        for path in files {
            validate_within_root(&self.root, path)?;
        }

        if files.is_empty() {
            return Ok(None);
        }

        let ai: std::collections::BTreeSet<PathBuf> = files.iter().cloned().collect();
        let scan = self.engine.scan()?;
        let mut last_commit = None;

        let manual_modified: Vec<PathBuf> = scan
            .modified
            .iter()
            .filter(|p| !ai.contains(*p))
            .cloned()
            .collect();
        if !manual_modified.is_empty() {
            let names: Vec<String> = manual_modified
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            let manual_response = format!("files: {}", names.join(", "));
            let commit_id = self.engine.snapshot(
                &manual_modified,
                "manual edit",
                CommitSource::User,
                Some("Manual edits detected before AI operation".to_string()),
                Some(manual_response.clone()),
                None,
            )?;
            self.enqueue(
                commit_id,
                "Manual edits detected before AI operation",
                &manual_response,
                None,
                &names,
                CommitSource::User,
            );
            info!(commit = %commit_id, files = manual_modified.len(), "committed manual edits ahead of AI interaction");
            last_commit = Some(commit_id);
        }

        let untracked: std::collections::BTreeSet<PathBuf> =
            scan.untracked.iter().cloned().collect();
        let untracked_ai: Vec<PathBuf> =
            files.iter().filter(|p| untracked.contains(*p)).cloned().collect();
        let modified_ai: Vec<PathBuf> = files
            .iter()
            .filter(|p| !untracked.contains(*p))
            .cloned()
            .collect();

        if !untracked_ai.is_empty() {
            let commit_id = self.engine.track(
                &untracked_ai,
                CommitSource::Ai,
                Some(prompt.to_string()),
                Some(response.to_string()),
            )?;
            let names: Vec<String> = untracked_ai
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            self.enqueue(commit_id, prompt, response, plan, &names, CommitSource::Ai);
            info!(commit = %commit_id, files = untracked_ai.len(), "tracked new AI-authored files");
            last_commit = Some(commit_id);
        }

        if !modified_ai.is_empty() {
            let commit_id = self.engine.snapshot(
                &modified_ai,
                "AI interaction",
                CommitSource::Ai,
                Some(prompt.to_string()),
                Some(response.to_string()),
                plan.map(|p| p.to_string()),
            )?;
            let names: Vec<String> = modified_ai
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            self.enqueue(commit_id, prompt, response, plan, &names, CommitSource::Ai);
            info!(commit = %commit_id, files = modified_ai.len(), "recorded AI interaction");
            last_commit = Some(commit_id);
        }

        Ok(last_commit)
    }

    /// Drains the Pending-Writes Queue into the Vector Store, embedding
    /// and chunking each entry. Returns how many entries were indexed.
    pub fn sync_pending(&mut self) -> Result<usize, MemovError> {
        let writes = self.pending.drain();
        let count = writes.len();
        let backend = EmbeddingBackend::Local;
        for write in writes {
            self.vectordb.insert_splitted(
                write.commit_id,
                write.role,
                &write.text,
                &write.files,
                write.source,
                &self.config.chunker,
                &backend,
            )?;
        }
        Ok(count)
    }

    pub fn vectordb(&self) -> &VectorStore {
        &self.vectordb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{HashKind, set_hash_kind_for_test};
    use crate::internal::object::ObjectTrait;
    use crate::internal::object::commit::{Commit, MemovMessage};
    use crate::refs::RefCatalog;
    use crate::store::ObjectStore;

    fn setup(dir: &Path) -> Recorder {
        let mem_dir = dir.join(".mem");
        std::fs::create_dir_all(&mem_dir).unwrap();
        ObjectStore::init(&mem_dir).unwrap();
        RefCatalog::init(&mem_dir).unwrap();
        Recorder::open(dir.to_path_buf(), &mem_dir, MemovConfig::default()).unwrap()
    }

    /// S1: a brand-new file, recorded via a single AI interaction.
    #[test]
    fn test_s1_record_new_file() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
        let mut recorder = setup(dir.path());

        let commit_id = recorder
            .record(
                &[PathBuf::from("main.rs")],
                "write a hello world",
                "created main.rs",
                Some("write fn main, compile"),
            )
            .unwrap()
            .unwrap();

        let commit: Commit = recorder.engine().store().read_object(&commit_id).unwrap();
        let body = MemovMessage::parse(&commit.message);
        assert_eq!(body.source, CommitSource::Ai);
        assert_eq!(body.files, vec!["main.rs"]);
        assert_eq!(recorder.pending_count(), 3);
    }

    /// S2: manual edits made before an AI interaction are committed first,
    /// under `User`, never folded into the AI commit.
    #[test]
    fn test_s2_manual_edit_commits_before_ai_commit() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hand written").unwrap();
        std::fs::write(dir.path().join("b.txt"), "ai target").unwrap();
        let mut recorder = setup(dir.path());
        recorder
            .engine_mut()
            .track(&[PathBuf::from("a.txt")], CommitSource::User, None, None)
            .unwrap();
        recorder
            .engine_mut()
            .snapshot_all("initial", CommitSource::User, None, None, None)
            .unwrap();

        // Manual edit lands on disk with nothing recording it yet.
        std::fs::write(dir.path().join("a.txt"), "hand written again").unwrap();

        let commit_id = recorder
            .record(&[PathBuf::from("b.txt")], "add b", "added b.txt", None)
            .unwrap()
            .unwrap();

        let ai_commit: Commit = recorder.engine().store().read_object(&commit_id).unwrap();
        let ai_body = MemovMessage::parse(&ai_commit.message);
        assert_eq!(ai_body.source, CommitSource::Ai);
        assert_eq!(ai_body.files, vec!["b.txt"]);

        let manual_commit: Commit = recorder
            .engine()
            .store()
            .read_object(ai_commit.parent_commit_ids.first().unwrap())
            .unwrap();
        let manual_body = MemovMessage::parse(&manual_commit.message);
        assert_eq!(manual_body.source, CommitSource::User);
    }

    /// S3: syncing pending writes indexes prompt, response, and plan.
    #[test]
    fn test_s3_sync_pending_indexes_all_roles() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        let mut recorder = setup(dir.path());

        recorder
            .record(&[PathBuf::from("a.rs")], "write fn a", "done", Some("plan it"))
            .unwrap();
        let synced = recorder.sync_pending().unwrap();
        assert_eq!(synced, 3);
        assert_eq!(recorder.pending_count(), 0);

        let hits = recorder
            .vectordb()
            .search(&crate::vectordb::EmbeddingBackend::Local.embed("write fn a"), 5);
        assert!(!hits.is_empty());
    }

    /// S4: recording without a plan still enqueues exactly prompt+response.
    #[test]
    fn test_s4_record_without_plan() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        let mut recorder = setup(dir.path());
        recorder
            .record(&[PathBuf::from("a.rs")], "p", "r", None)
            .unwrap();
        assert_eq!(recorder.pending_count(), 2);
    }

    /// A path escaping the project root is rejected before any commit.
    #[test]
    fn test_path_outside_project_rejected() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = setup(dir.path());
        let result = recorder.record(
            &[PathBuf::from("../escape.rs")],
            "p",
            "r",
            None,
        );
        assert!(matches!(result, Err(MemovError::PathOutsideProject(_))));
    }

    /// A prompt-only interaction with no files changed never touches
    /// history.
    #[test]
    fn test_empty_files_changed_is_a_no_op() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = setup(dir.path());
        let result = recorder.record(&[], "p", "r", None).unwrap();
        assert!(result.is_none());
        assert_eq!(recorder.pending_count(), 0);
    }

    /// One interaction touching both a brand-new file and an already
    /// tracked one issues a `track` commit for the new file followed by a
    /// partial-snapshot commit for the already-tracked one, in that order.
    #[test]
    fn test_record_partitions_untracked_and_modified_ai_files() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        let mut recorder = setup(dir.path());
        recorder
            .engine_mut()
            .track(&[PathBuf::from("a.rs")], CommitSource::User, None, None)
            .unwrap();

        std::fs::write(dir.path().join("a.rs"), "fn a() { 1 }").unwrap();
        std::fs::write(dir.path().join("new.rs"), "fn new() {}").unwrap();

        let commit_id = recorder
            .record(
                &[PathBuf::from("new.rs"), PathBuf::from("a.rs")],
                "add new fn, tweak a",
                "done",
                None,
            )
            .unwrap()
            .unwrap();

        let snapshot_commit: Commit = recorder.engine().store().read_object(&commit_id).unwrap();
        let snapshot_body = MemovMessage::parse(&snapshot_commit.message);
        assert_eq!(snapshot_body.source, CommitSource::Ai);
        assert_eq!(snapshot_body.files, vec!["a.rs"]);

        let track_commit: Commit = recorder
            .engine()
            .store()
            .read_object(snapshot_commit.parent_commit_ids.first().unwrap())
            .unwrap();
        let track_body = MemovMessage::parse(&track_commit.message);
        assert_eq!(track_body.source, CommitSource::Ai);
        assert_eq!(track_body.files, vec!["new.rs"]);
    }

    /// S6: two interactions touching different files produce a linear
    /// two-commit history, each citing the other as parent.
    #[test]
    fn test_s6_sequential_interactions_are_linear() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        std::fs::write(dir.path().join("b.rs"), "fn b() {}").unwrap();
        let mut recorder = setup(dir.path());

        let c1 = recorder
            .record(&[PathBuf::from("a.rs")], "write a", "done a", None)
            .unwrap()
            .unwrap();
        let c2 = recorder
            .record(&[PathBuf::from("b.rs")], "write b", "done b", None)
            .unwrap()
            .unwrap();

        let commit2: Commit = recorder.engine().store().read_object(&c2).unwrap();
        assert_eq!(commit2.parent_commit_ids, vec![c1]);
    }
}
