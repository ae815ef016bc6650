//! Project discovery and the `.mem` directory layout:
//!
//! ```text
//! .mem/
//!   memov.git/      object store (loose objects, Git-compatible)
//!   branches.json   ref catalog
//!   tracked.json    tracked-path registry
//!   notes.json      commit -> note mapping
//!   vectordb/       embedded vector index
//!   logs/           reserved for an application's own log files
//!   config.json     project configuration
//! ```

use std::path::{Path, PathBuf};

use crate::config::MemovConfig;
use crate::error::MemovError;
use crate::recorder::Recorder;
use crate::refs::RefCatalog;
use crate::snapshot::SnapshotEngine;
use crate::store::ObjectStore;

/// A memov project: a workspace root paired with its `.mem` store.
pub struct Project {
    pub root: PathBuf,
    pub mem_dir: PathBuf,
    pub config: MemovConfig,
}

impl Project {
    /// Initializes a new project at `root`. Fails if `.mem` already exists
    /// there.
    pub fn init(root: &Path) -> Result<Project, MemovError> {
        let mem_dir = root.join(".mem");
        if mem_dir.exists() {
            return Err(MemovError::Unknown(format!(
                "{} is already a memov project",
                root.display()
            )));
        }
        std::fs::create_dir_all(&mem_dir)?;
        ObjectStore::init(&mem_dir)?;
        RefCatalog::init(&mem_dir)?;
        std::fs::create_dir_all(mem_dir.join("logs"))?;
        std::fs::create_dir_all(mem_dir.join("vectordb"))?;

        let config = MemovConfig::default();
        config.save(&mem_dir)?;

        Ok(Project {
            root: root.to_path_buf(),
            mem_dir,
            config,
        })
    }

    /// Walks upward from `start` looking for the nearest ancestor (or
    /// `start` itself) containing a `.mem` directory.
    pub fn discover(start: &Path) -> Result<Project, MemovError> {
        let mut current = start.to_path_buf();
        loop {
            let mem_dir = current.join(".mem");
            if mem_dir.is_dir() {
                let config = MemovConfig::load(&mem_dir)?;
                return Ok(Project {
                    root: current,
                    mem_dir,
                    config,
                });
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Err(MemovError::ProjectNotFound(start.display().to_string())),
            }
        }
    }

    pub fn recorder(&self) -> Result<Recorder, MemovError> {
        Recorder::open(self.root.clone(), &self.mem_dir, self.config.clone())
    }

    pub fn snapshot_engine(&self) -> Result<SnapshotEngine, MemovError> {
        SnapshotEngine::open(self.root.clone(), &self.mem_dir, self.config.clone())
    }
}
