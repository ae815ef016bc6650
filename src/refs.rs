//! Component B: the Ref Catalog. `branches.json` is a single JSON document
//! mapping branch names to the commit each currently points at, plus the
//! pointer to whichever branch (or detached commit) is currently checked
//! out.
//!
//! The catalog is written as the very last step of a commit, after the
//! object store write has succeeded, so a crash mid-commit never leaves
//! `branches.json` pointing at an object that doesn't exist on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MemovError;
use crate::hash::ObjectHash;

const DEFAULT_BRANCH: &str = "main";

/// Where the working tree currently points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// Checked out on a named branch; commits advance that branch.
    Branch(String),
    /// Checked out directly on a commit (after `jump` to a non-tip
    /// revision); commits from here do not move any branch pointer.
    Detached(ObjectHash),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct CatalogFile {
    branches: BTreeMap<String, String>,
    head: Option<String>,
    detached: Option<String>,
}

/// In-memory view of `branches.json`, reloaded from disk on `open` and
/// written back on every mutation.
pub struct RefCatalog {
    path: PathBuf,
    branches: BTreeMap<String, ObjectHash>,
    head: Head,
}

impl RefCatalog {
    /// Creates a fresh, empty catalog pointing at `main` with no commits
    /// yet.
    pub fn init(mem_dir: &Path) -> Result<RefCatalog, MemovError> {
        let catalog = RefCatalog {
            path: mem_dir.join("branches.json"),
            branches: BTreeMap::new(),
            head: Head::Branch(DEFAULT_BRANCH.to_string()),
        };
        catalog.save()?;
        Ok(catalog)
    }

    pub fn open(mem_dir: &Path) -> Result<RefCatalog, MemovError> {
        let path = mem_dir.join("branches.json");
        let text = std::fs::read_to_string(&path)?;
        let file: CatalogFile = serde_json::from_str(&text)
            .map_err(|e| MemovError::Unknown(format!("invalid branches.json: {e}")))?;

        let mut branches = BTreeMap::new();
        for (name, hash) in file.branches {
            let hash = ObjectHash::from_str(&hash)
                .map_err(|e| MemovError::Unknown(format!("invalid hash in branches.json: {e}")))?;
            branches.insert(name, hash);
        }

        let head = if let Some(hash) = file.detached {
            Head::Detached(
                ObjectHash::from_str(&hash)
                    .map_err(|e| MemovError::Unknown(format!("invalid detached head: {e}")))?,
            )
        } else {
            Head::Branch(file.head.unwrap_or_else(|| DEFAULT_BRANCH.to_string()))
        };

        Ok(RefCatalog {
            path,
            branches,
            head,
        })
    }

    fn save(&self) -> Result<(), MemovError> {
        let mut file = CatalogFile {
            branches: self
                .branches
                .iter()
                .map(|(name, hash)| (name.clone(), hash.to_string()))
                .collect(),
            head: None,
            detached: None,
        };
        match &self.head {
            Head::Branch(name) => file.head = Some(name.clone()),
            Head::Detached(hash) => file.detached = Some(hash.to_string()),
        }
        let text = serde_json::to_string_pretty(&file)
            .map_err(|e| MemovError::Unknown(format!("can't serialize branches.json: {e}")))?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    pub fn head(&self) -> &Head {
        &self.head
    }

    pub fn current_branch(&self) -> Option<&str> {
        match &self.head {
            Head::Branch(name) => Some(name.as_str()),
            Head::Detached(_) => None,
        }
    }

    /// The commit the current head resolves to, or `None` for a fresh
    /// project with no commits yet.
    pub fn head_commit(&self) -> Option<ObjectHash> {
        match &self.head {
            Head::Branch(name) => self.branches.get(name).copied(),
            Head::Detached(hash) => Some(*hash),
        }
    }

    pub fn branch_commit(&self, name: &str) -> Option<ObjectHash> {
        self.branches.get(name).copied()
    }

    pub fn branches(&self) -> impl Iterator<Item = (&str, ObjectHash)> {
        self.branches.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Advances the ref catalog after a new commit is written. Six cases,
    /// tried in order:
    ///
    /// 1. The catalog holds no branches yet, create `main` pointing at the
    ///    new commit and check it out.
    /// 2. Head names a branch that already points somewhere, fast-forward
    ///    it to the new commit (a no-op if it already points there).
    /// 3. Head names a branch that exists but hasn't been given a tip yet
    ///    (freshly created by `checkout_new_branch`), give it one.
    /// 4. Head is detached and some branch's tip equals the new commit's
    ///    parent, that branch is the one this commit actually continues:
    ///    adopt it, advance it, and leave head checked out on it.
    /// 5. Head is detached and no branch continues from here, but `main`
    ///    has no tip of its own (never committed to, or not yet adopted by
    ///    a prior detached commit), claim it.
    /// 6. Otherwise allocate a fresh `develop/<N>` branch, the smallest N
    ///    not already in use, point it at the new commit, and check it
    ///    out. This is how a commit made after `jump`ing to a non-tip
    ///    revision gets a name instead of leaving history unreachable.
    ///
    /// A detached advance (cases 4-6) always ends checked out on a branch;
    /// head only stays detached between `checkout_detached` and the next
    /// commit, never across one.
    pub fn advance(&mut self, new_commit: ObjectHash) -> Result<(), MemovError> {
        if self.branches.is_empty() {
            self.branches.insert(DEFAULT_BRANCH.to_string(), new_commit);
            self.head = Head::Branch(DEFAULT_BRANCH.to_string());
            debug!(commit = %new_commit, "created main on first commit");
            return self.save();
        }

        match &self.head {
            Head::Branch(name) => {
                let name = name.clone();
                if self.branches.get(&name) == Some(&new_commit) {
                    return Ok(());
                }
                self.branches.insert(name.clone(), new_commit);
                debug!(branch = %name, commit = %new_commit, "advanced branch");
                self.save()
            }
            Head::Detached(old_head) => {
                let old_head = *old_head;
                if let Some(name) = self
                    .branches
                    .iter()
                    .find(|(_, tip)| **tip == old_head)
                    .map(|(name, _)| name.clone())
                {
                    self.branches.insert(name.clone(), new_commit);
                    self.head = Head::Branch(name.clone());
                    debug!(branch = %name, commit = %new_commit, "adopted branch continuing detached head");
                } else if !self.branches.contains_key(DEFAULT_BRANCH) {
                    self.branches.insert(DEFAULT_BRANCH.to_string(), new_commit);
                    self.head = Head::Branch(DEFAULT_BRANCH.to_string());
                    debug!(commit = %new_commit, "claimed unused main from detached head");
                } else {
                    let name = self.next_develop_name();
                    self.branches.insert(name.clone(), new_commit);
                    self.head = Head::Branch(name.clone());
                    debug!(branch = %name, commit = %new_commit, "allocated branch for detached commit");
                }
                self.save()
            }
        }
    }

    /// Smallest `develop/<N>` not already present in the catalog.
    fn next_develop_name(&self) -> String {
        let mut n = 0u32;
        loop {
            let candidate = format!("develop/{n}");
            if !self.branches.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Creates a new branch at `from` (typically the current head) and
    /// checks it out, without creating any commit.
    pub fn checkout_new_branch(&mut self, name: &str, from: ObjectHash) -> Result<(), MemovError> {
        self.branches.insert(name.to_string(), from);
        self.head = Head::Branch(name.to_string());
        self.save()
    }

    /// Checks out an existing branch by name.
    pub fn checkout_branch(&mut self, name: &str) -> Result<(), MemovError> {
        if !self.branches.contains_key(name) {
            return Err(MemovError::Unknown(format!("no such branch: {name}")));
        }
        self.head = Head::Branch(name.to_string());
        self.save()
    }

    /// Checks out a specific commit directly, detaching head from any
    /// branch, used by `jump` to a non-tip revision.
    pub fn checkout_detached(&mut self, commit: ObjectHash) -> Result<(), MemovError> {
        self.head = Head::Detached(commit);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{HashKind, set_hash_kind_for_test};
    use crate::internal::object::types::ObjectType;

    fn commit_hash(seed: &str) -> ObjectHash {
        ObjectHash::from_type_and_data(ObjectType::Commit, seed.as_bytes())
    }

    #[test]
    fn test_first_commit_creates_main() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = RefCatalog::init(dir.path()).unwrap();
        let c1 = commit_hash("one");
        catalog.advance(c1).unwrap();
        assert_eq!(catalog.current_branch(), Some("main"));
        assert_eq!(catalog.head_commit(), Some(c1));
    }

    #[test]
    fn test_branch_advance_is_isolated() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = RefCatalog::init(dir.path()).unwrap();
        let c1 = commit_hash("one");
        catalog.advance(c1).unwrap();

        catalog.checkout_new_branch("feature", c1).unwrap();
        let c2 = commit_hash("two");
        catalog.advance(c2).unwrap();

        assert_eq!(catalog.branch_commit("feature"), Some(c2));
        assert_eq!(catalog.branch_commit("main"), Some(c1));
    }

    #[test]
    fn test_detached_advance_at_branch_tip_adopts_that_branch() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = RefCatalog::init(dir.path()).unwrap();
        let c1 = commit_hash("one");
        catalog.advance(c1).unwrap();

        // Detaching at main's own tip and committing from there continues
        // main rather than stranding the commit on an anonymous head.
        catalog.checkout_detached(c1).unwrap();
        let c2 = commit_hash("two");
        catalog.advance(c2).unwrap();

        assert_eq!(catalog.branch_commit("main"), Some(c2));
        assert_eq!(catalog.head_commit(), Some(c2));
        assert_eq!(catalog.current_branch(), Some("main"));
    }

    /// Scenario S5: jumping to a non-tip revision and then committing from
    /// there must not silently move `main`, nor leave the new commit on an
    /// unnamed detached head. It gets its own `develop/0` branch.
    #[test]
    fn test_s5_commit_after_jump_to_non_tip_allocates_develop_branch() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = RefCatalog::init(dir.path()).unwrap();
        let h0 = commit_hash("h0");
        catalog.advance(h0).unwrap();
        let h1 = commit_hash("h1");
        catalog.advance(h1).unwrap();
        let h2 = commit_hash("h2");
        catalog.advance(h2).unwrap();

        catalog.checkout_detached(h0).unwrap();
        assert_eq!(catalog.current_branch(), None);

        let j1 = commit_hash("j1");
        catalog.advance(j1).unwrap();

        assert_eq!(catalog.current_branch(), Some("develop/0"));
        assert_eq!(catalog.branch_commit("develop/0"), Some(j1));
        assert_eq!(catalog.branch_commit("main"), Some(h2));
    }

    #[test]
    fn test_develop_name_allocation_skips_existing_branches() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = RefCatalog::init(dir.path()).unwrap();
        let h0 = commit_hash("h0");
        catalog.advance(h0).unwrap();
        catalog.checkout_new_branch("develop/0", h0).unwrap();

        catalog.checkout_detached(commit_hash("elsewhere")).unwrap();
        let j1 = commit_hash("j1");
        catalog.advance(j1).unwrap();

        assert_eq!(catalog.current_branch(), Some("develop/1"));
    }

    #[test]
    fn test_reopen_round_trips_state() {
        let _guard = set_hash_kind_for_test(HashKind::Sha1);
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = RefCatalog::init(dir.path()).unwrap();
        let c1 = commit_hash("one");
        catalog.advance(c1).unwrap();
        drop(catalog);

        let reopened = RefCatalog::open(dir.path()).unwrap();
        assert_eq!(reopened.head_commit(), Some(c1));
    }
}
