// ============================================================
// Layer 2: TemplateVectorsUseCase
// ============================================================
// Serves TF-IDF vectors for the templates an aggregation run
// left in out_dir/dict_templ.csv:
//
//   Step 1: Validate the window and TF-IDF parameters     (Layer 2)
//   Step 2: Load the snapshot, sorted by ID                (Layer 6)
//   Step 3: Fit the model on all templates, or load it     (Layer 4/6)
//   Step 4: Vectorize the templates inside the window      (Layer 4)
//
// The window is clamped to the snapshot: start and end never
// exceed the number of templates.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::data::tfidf::TfidfParams;
use crate::domain::records::{TemplateVectorBatch, TemplateVectorRow};
use crate::error::MinerError;
use crate::infra::{
    checkpoint::{load_snapshot, SNAPSHOT_FILE},
    tfidf_store::TfidfStore,
};

/// Rows per window when the caller does not pick one
pub const DEFAULT_ROW_LIMIT: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateVectorsConfig {
    /// Aggregation destination holding dict_templ.csv
    pub out_dir: String,
    pub offset:  usize,
    pub limit:   usize,
    pub tfidf:   TfidfParams,
}

impl Default for TemplateVectorsConfig {
    fn default() -> Self {
        Self {
            out_dir: "out".to_string(),
            offset:  0,
            limit:   DEFAULT_ROW_LIMIT,
            tfidf:   TfidfParams::default(),
        }
    }
}

pub struct TemplateVectorsUseCase {
    config: TemplateVectorsConfig,
}

impl TemplateVectorsUseCase {
    pub fn new(config: TemplateVectorsConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TemplateVectorBatch> {
        let cfg = &self.config;

        // ── Step 1 ───────────────────────────────────────────────────────────
        if cfg.limit == 0 {
            return Err(MinerError::InvalidConfig("limit must be at least 1".into()).into());
        }
        cfg.tfidf.validate()?;

        // ── Step 2: The snapshot must exist ──────────────────────────────────
        let snapshot = Path::new(&cfg.out_dir).join(SNAPSHOT_FILE);
        fs::metadata(&snapshot)
            .map_err(|source| MinerError::InputUnavailable {
                path: snapshot.clone(),
                source,
            })
            .context("Run 'aggregate' into this directory first")?;
        let entries = load_snapshot(&snapshot)?;
        let total   = entries.len();

        // ── Step 3: Fit over every template, not just the window ─────────────
        let texts: Vec<&str> = entries.iter().map(|e| e.template.as_str()).collect();
        let (model, outcome) = TfidfStore::new(&cfg.out_dir).fit_or_load(&texts, &cfg.tfidf)?;
        tracing::info!("TF-IDF model {}: {} features, {} templates", outcome, model.dim(), total);

        // ── Step 4 ───────────────────────────────────────────────────────────
        let start = cfg.offset.min(total);
        let end   = cfg.offset.saturating_add(cfg.limit).min(total);
        let rows  = entries[start..end]
            .iter()
            .map(|e| TemplateVectorRow {
                templ_id: e.id,
                template: e.template.clone(),
                vector:   model.transform(&e.template),
            })
            .collect();

        Ok(TemplateVectorBatch {
            start,
            end,
            total,
            dim: model.dim(),
            rows,
        })
    }
}
