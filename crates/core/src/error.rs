//! Public error taxonomy.
//!
//! Most internal fallibility (file reads during parsing, tree-sitter setup)
//! stays on `anyhow::Result` elsewhere in this crate — those failures are
//! recorded into `ParsedFile::errors` or `Statistics` and never propagate.
//! `CoreError` is reserved for the two caller-facing outcomes callers
//! need to branch on: an invalid repository root, and querying an
//! orchestrator that hasn't built a graph yet.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("path does not exist or is not a directory: {0}")]
    PathInvalid(PathBuf),

    #[error("graph not built: call build_graph() before issuing queries")]
    NotBuilt,
}
