// ============================================================
// Layer 2: InspectUseCase
// ============================================================
// Read-only views over finished runs, for consumers that did not
// run the pipelines themselves:
//
//   templates  - entries of an aggregation snapshot, by ID
//   status     - is a vectorizer output dir complete, and its meta
//   vectors    - a window of vector records by line offset

use anyhow::Result;
use std::path::Path;

use crate::domain::records::{ArtifactStatus, SnapshotEntry, VectorBatch};
use crate::error::MinerError;
use crate::infra::{artifacts::ArtifactStore, checkpoint::load_snapshot};

/// Window size used when the caller does not pick one
pub const DEFAULT_VECTOR_LIMIT: u64 = 1000;

pub struct InspectUseCase {
    store: ArtifactStore,
}

impl InspectUseCase {
    /// Inspect the vectorizer outputs in `out_dir`
    pub fn new(out_dir: impl AsRef<Path>) -> Self {
        Self {
            store: ArtifactStore::new(out_dir.as_ref()),
        }
    }

    pub fn status(&self) -> ArtifactStatus {
        self.store.status()
    }

    /// Records at lines `[offset, offset + limit)`
    pub fn vectors(&self, offset: u64, limit: u64) -> Result<VectorBatch> {
        if limit == 0 {
            return Err(MinerError::InvalidConfig("limit must be at least 1".into()).into());
        }
        self.store.read_vectors(offset, limit)
    }
}

/// Entries of an aggregation snapshot, sorted by ID
pub fn snapshot_templates(path: impl AsRef<Path>) -> Result<Vec<SnapshotEntry>> {
    load_snapshot(path.as_ref())
}
