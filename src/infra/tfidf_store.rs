// ============================================================
// Layer 6: Template TF-IDF Model Store
// ============================================================
// Persists the fitted template TF-IDF model next to the snapshot
// it was fitted on:
//
//   out_dir/
//     dict_templ.csv   ← written by `aggregate`
//     tfidf.json       ← { params, vocabulary, idf }
//
// The first request fits and saves; later requests load the
// saved model as is, whatever parameters they ask for. Delete
// tfidf.json to refit.

use anyhow::{Context, Result};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::data::tfidf::{TfidfModel, TfidfParams};
use crate::infra::atomic::AtomicFile;

pub const TFIDF_FILE: &str = "tfidf.json";

/// How `fit_or_load` obtained its model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    Loaded,
    Fitted,
}

impl fmt::Display for FitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitOutcome::Loaded => f.write_str("loaded"),
            FitOutcome::Fitted => f.write_str("fitted"),
        }
    }
}

pub struct TfidfStore {
    path: PathBuf,
}

impl TfidfStore {
    pub fn new(out_dir: impl AsRef<Path>) -> Self {
        Self {
            path: out_dir.as_ref().join(TFIDF_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved model, or fit one on `docs` and save it
    pub fn fit_or_load<S: AsRef<str>>(
        &self,
        docs:   &[S],
        params: &TfidfParams,
    ) -> Result<(TfidfModel, FitOutcome)> {
        if self.path.exists() {
            let model = self.load()?;
            if model.params() != params {
                tracing::warn!(
                    "'{}' was fitted with {:?}; ignoring {:?}. Delete it to refit.",
                    self.path.display(),
                    model.params(),
                    params
                );
            }
            return Ok((model, FitOutcome::Loaded));
        }

        let model = TfidfModel::fit(docs, params.clone())?;
        self.save(&model)?;
        Ok((model, FitOutcome::Fitted))
    }

    fn load(&self) -> Result<TfidfModel> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read '{}'", self.path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Malformed '{}'", self.path.display()))
    }

    fn save(&self, model: &TfidfModel) -> Result<()> {
        let mut out = AtomicFile::create(&self.path)?;
        serde_json::to_writer(&mut out, model)
            .with_context(|| format!("Cannot serialise '{}'", self.path.display()))?;
        out.commit()?;
        tracing::debug!("Saved {} features to '{}'", model.dim(), self.path.display());
        Ok(())
    }
}
