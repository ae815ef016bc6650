//! memov: a content-addressed snapshot engine and interaction recorder for
//! AI-assisted development, with a built-in semantic memory store.
//!
//! Three subsystems sit on top of the same object store a plain version
//! control tool would use:
//!
//! - The **Snapshot Engine** ([`snapshot`]) tracks files and commits their
//!   content, either all at once or as an explicitly named partial set.
//! - The **Interaction Recorder** ([`recorder`]) wraps the Snapshot Engine
//!   to attribute a commit to a human or an AI agent, and to queue the
//!   prompt/response/plan text behind that commit for semantic search.
//! - **Semantic Memory** ([`vectordb`], [`chunker`]) makes that queued text
//!   searchable without a server process.
//!
//! [`Project`](project::Project) ties a workspace root to its `.mem`
//! store and is the usual entry point.

pub mod chunker;
pub mod config;
pub mod error;
pub mod errors;
pub mod hash;
pub mod history;
pub mod ignore;
pub mod internal;
pub mod pending;
pub mod project;
pub mod recorder;
pub mod refs;
pub mod scanner;
pub mod snapshot;
pub mod store;
pub mod utils;
pub mod vectordb;
