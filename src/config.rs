//! Project-level configuration, read from `.mem/config.json` when present
//! and otherwise fully defined by compiled-in defaults. No field is
//! required to exist on disk.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MemovError;
use crate::hash::HashKind;

/// Tuning for the Text Chunker (component F).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            overlap: 200,
        }
    }
}

/// Which embedding backend the Vector Store (component G) embeds text with.
///
/// Only a tag is stored in config; `Fixed`, which also carries a vector, is
/// a test/fixture-only backend and is never selected from a config file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackendKind {
    #[default]
    Local,
}

/// The identity attributed to every commit this project creates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: "memov".to_string(),
            email: "memov@localhost".to_string(),
        }
    }
}

/// Project-wide configuration, loaded once when a `Project` is opened.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MemovConfig {
    pub hash_kind: HashKind,
    pub identity: Identity,
    pub chunker: ChunkerConfig,
    pub embedding_backend: EmbeddingBackendKind,
}

impl Default for MemovConfig {
    fn default() -> Self {
        Self {
            hash_kind: HashKind::default(),
            identity: Identity::default(),
            chunker: ChunkerConfig::default(),
            embedding_backend: EmbeddingBackendKind::default(),
        }
    }
}

impl MemovConfig {
    /// Loads `config.json` from a `.mem` directory. Missing file is not an
    /// error; it just means every field falls back to its default.
    pub fn load(mem_dir: &Path) -> Result<MemovConfig, MemovError> {
        let path = mem_dir.join("config.json");
        if !path.exists() {
            return Ok(MemovConfig::default());
        }
        let text = std::fs::read_to_string(&path)?;
        let config = serde_json::from_str(&text)
            .map_err(|e| MemovError::Unknown(format!("invalid config.json: {e}")))?;
        Ok(config)
    }

    pub fn save(&self, mem_dir: &Path) -> Result<(), MemovError> {
        let path = mem_dir.join("config.json");
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| MemovError::Unknown(format!("can't serialize config: {e}")))?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
