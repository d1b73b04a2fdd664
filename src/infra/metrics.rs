// ============================================================
// Layer 6: Run Metrics
// ============================================================
// Counters collected while a pipeline runs. They are logged once
// at the end of the run and handed back to the CLI, which prints
// the one-line summary.
//
// Aggregation runs fill the file/batch/checkpoint counters;
// vectorizer runs fill the document/unresolved counters.
//
// Example summary:
//   files=3 skipped=1 lines=25000 batches=4 checkpoints=2 templates=118

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which pipeline a set of counters belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    #[default]
    Aggregate,
    Vectorize,
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pipeline::Aggregate => f.write_str("aggregate"),
            Pipeline::Vectorize => f.write_str("vectorize"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub pipeline: Pipeline,

    /// Files picked up by the run
    pub files_seen: usize,

    /// Files that could not be opened or read through
    pub files_skipped: usize,

    /// Raw lines read, empty ones included
    pub lines_read: u64,

    /// Lines that produced no template
    pub lines_skipped: u64,

    /// Batches handed to the dictionary
    pub batches: u64,

    /// Snapshots written
    pub checkpoints: u64,

    /// Distinct templates at the end of the run
    pub templates: usize,

    /// Lines that became documents (vectorizer)
    pub num_docs: u64,

    /// Vector records emitted with an unresolved template
    pub unresolved: u64,
}

impl RunMetrics {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            ..Self::default()
        }
    }

    /// Log the final counters
    pub fn log(&self) {
        tracing::info!("{} finished: {}", self.pipeline, self);
        if self.unresolved > 0 {
            tracing::warn!(
                "{} line(s) had no template in the dictionary; was the input modified mid-run?",
                self.unresolved
            );
        }
    }
}

impl fmt::Display for RunMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pipeline {
            Pipeline::Vectorize => write!(
                f,
                "docs={} lines={} skipped_lines={} templates={} unresolved={}",
                self.num_docs, self.lines_read, self.lines_skipped, self.templates, self.unresolved,
            ),
            Pipeline::Aggregate => write!(
                f,
                "files={} skipped={} lines={} skipped_lines={} batches={} checkpoints={} templates={}",
                self.files_seen,
                self.files_skipped,
                self.lines_read,
                self.lines_skipped,
                self.batches,
                self.checkpoints,
                self.templates,
            ),
        }
    }
}
