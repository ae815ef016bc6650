//! Component G: the Vector Store.
//!
//! The embedding backend is a pluggable concern; the original implementation
//! binds to `chromadb`, which has no Rust equivalent in this crate's
//! dependency set. Rather than fabricate a binding to a vector database
//! this crate cannot actually link against, embeddings are produced by a
//! small sum type and stored in an in-process, disk-backed index
//! appropriate at memov's scale: one project's interaction history, not a
//! web-scale corpus.

use std::collections::BTreeSet;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::chunker::chunk_text;
use crate::config::ChunkerConfig;
use crate::error::MemovError;
use crate::hash::ObjectHash;
use crate::internal::object::types::CommitSource;

const EMBEDDING_DIM: usize = 256;

/// Which role a piece of indexed text played in an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Prompt,
    Response,
    Plan,
}

/// How a vector is produced from text.
///
/// `Local` is deterministic and needs no network or bundled model, standing
/// in for the embedded default embedding function the original's `chromadb`
/// dependency ships with. `Fixed` always returns the same vector and exists
/// only to make tests independent of the hashing scheme's details.
pub enum EmbeddingBackend {
    Local,
    Fixed(Vec<f32>),
}

impl EmbeddingBackend {
    pub fn embed(&self, text: &str) -> Vec<f32> {
        match self {
            EmbeddingBackend::Local => local_embed(text),
            EmbeddingBackend::Fixed(vector) => vector.clone(),
        }
    }
}

/// A deterministic, model-free embedding: each whitespace-separated token
/// is hashed into a bucket of a fixed-size vector (the "hashing trick"),
/// then the vector is L2-normalized so cosine similarity behaves sanely.
fn local_embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0f32; EMBEDDING_DIM];
    for token in text.split_whitespace() {
        let mut hasher = ahash::AHasher::default();
        std::hash::Hash::hash(&token.to_lowercase(), &mut hasher);
        let bucket = (std::hash::Hasher::finish(&hasher) as usize) % EMBEDDING_DIM;
        vector[bucket] += 1.0;
    }
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
    vector
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// One indexed chunk: a piece of a prompt, response, or plan, tied back to
/// the commit it came from so a search hit can be resolved to history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub commit_id: String,
    pub role: Role,
    pub chunk_index: usize,
    pub text: String,
    pub vector: Vec<f32>,
    pub files: Vec<String>,
    pub source: CommitSource,
}

/// A scored search hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub record: VectorRecord,
    pub score: f32,
}

/// In-memory index backed by one JSON-lines file per project, loaded
/// eagerly at `open` and flushed after every mutation, giving the same
/// "always queryable without a server process" property the original's
/// embedded-mode vector database gives it.
pub struct VectorStore {
    path: PathBuf,
    records: DashMap<String, VectorRecord>,
}

impl VectorStore {
    pub fn open(mem_dir: &Path) -> Result<VectorStore, MemovError> {
        let dir = mem_dir.join("vectordb");
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("records.jsonl");

        let records = DashMap::new();
        if path.is_file() {
            let text = std::fs::read_to_string(&path)?;
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                let record: VectorRecord = serde_json::from_str(line)
                    .map_err(|e| MemovError::Unknown(format!("invalid vectordb record: {e}")))?;
                records.insert(record.id.clone(), record);
            }
        }

        Ok(VectorStore { path, records })
    }

    fn flush(&self) -> Result<(), MemovError> {
        let mut file = std::fs::File::create(&self.path)?;
        for entry in self.records.iter() {
            let line = serde_json::to_string(entry.value())
                .map_err(|e| MemovError::Unknown(format!("can't serialize record: {e}")))?;
            writeln!(file, "{line}")?;
        }
        Ok(())
    }

    pub fn insert(&self, record: VectorRecord) -> Result<(), MemovError> {
        self.records.insert(record.id.clone(), record);
        self.flush()
    }

    pub fn delete(&self, id: &str) -> Result<(), MemovError> {
        if self.records.remove(id).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    /// Chunks `text`, embeds each chunk, and inserts one record per chunk.
    /// Returns the ids created.
    pub fn insert_splitted(
        &self,
        commit_id: ObjectHash,
        role: Role,
        text: &str,
        files: &[String],
        source: CommitSource,
        chunker: &ChunkerConfig,
        backend: &EmbeddingBackend,
    ) -> Result<Vec<String>, MemovError> {
        let chunks = chunk_text(text, chunker.chunk_size, chunker.overlap);
        let mut ids = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.into_iter().enumerate() {
            let id = format!("{commit_id}:{role:?}:{index}");
            let record = VectorRecord {
                id: id.clone(),
                commit_id: commit_id.to_string(),
                role,
                chunk_index: index,
                vector: backend.embed(&chunk.text),
                text: chunk.text,
                files: files.to_vec(),
                source,
            };
            self.insert(record)?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// Brute-force cosine similarity search over every indexed chunk.
    pub fn search(&self, query: &[f32], limit: usize) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = self
            .records
            .iter()
            .map(|entry| SearchHit {
                record: entry.value().clone(),
                score: cosine_similarity(query, &entry.value().vector),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        hits
    }

    /// Finds every distinct commit that touched any of `files`. Metadata
    /// filtering first, falling back to a full scan when a record predates
    /// a metadata schema addition, nothing here assumes every record on
    /// disk shares a schema version.
    pub fn find_commits_by_files(&self, files: &[String]) -> BTreeSet<String> {
        let wanted: BTreeSet<&str> = files.iter().map(|s| s.as_str()).collect();
        self.records
            .iter()
            .filter(|entry| entry.value().files.iter().any(|f| wanted.contains(f.as_str())))
            .map(|entry| entry.value().commit_id.clone())
            .collect()
    }
}
