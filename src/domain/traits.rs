// ============================================================
// Layer 3: Core Traits (Abstractions)
// ============================================================
// The application layer talks to these traits, not to the
// concrete loaders and writers in Layers 4 and 6:
//
//   LogSource     - yields the files an aggregation run reads
//   Checkpointer  - persists a dictionary snapshot
//
// Tests plug in in-memory implementations of both.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use std::path::PathBuf;

use crate::domain::dictionary::TemplateDictionary;

// ─── LogSource ────────────────────────────────────────────────────────────────
/// Any component that can list the log files of a run.
///
/// Implementations:
///   - LogDirLoader → `*.log` files directly inside one directory
pub trait LogSource {
    /// Files to process, in processing order
    fn log_files(&self) -> Result<Vec<PathBuf>>;
}

// ─── Checkpointer ─────────────────────────────────────────────────────────────
/// Any component that can persist the whole dictionary.
///
/// Each call replaces the previous snapshot entirely.
pub trait Checkpointer {
    fn checkpoint(&mut self, dictionary: &TemplateDictionary) -> Result<()>;
}
