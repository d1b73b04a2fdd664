// ============================================================
// Layer 2: VectorizeUseCase (pipeline B)
// ============================================================
// Two passes over one input file:
//
//   Pass 1 (build)
//     Step 1: Stream lines, split off the alert tag        (Layer 4)
//     Step 2: Normalize the rest into a template           (Layer 4)
//     Step 3: Assign template IDs, count frequencies       (Layer 3/4)
//     Step 4: Derive IDF weights once                      (Layer 4)
//     Step 5: Write templates.json and meta.json           (Layer 6)
//
//   Pass 2 (encode)
//     Step 6: Re-open and re-stream the same input         (Layer 4)
//     Step 7: Re-derive each template, look it up          (Layer 3)
//     Step 8: Emit one sparse vector per line              (Layer 6)
//
// Pass 2 never inserts. Normalization is deterministic, so on an
// unchanged input every lookup succeeds; a miss is written as
// template_id -1 with no coordinates instead of aborting.
//
// Only the dictionary, frequencies and IDF weights stay in memory;
// the file content is streamed in both passes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
};

use crate::data::{
    loader::{open_lines, LineReader},
    normalizer::VectorizerNormalizer,
    stats::{FrequencyTable, IdfTable},
};
use crate::domain::{
    dictionary::TemplateDictionary,
    records::{CorpusMeta, VectorRecord},
    template::TemplateId,
};
use crate::error::MinerError;
use crate::infra::{
    artifacts::{write_jsonl_record, ArtifactStore, VECTORS_FILE},
    metrics::{Pipeline, RunMetrics},
};

// ─── Vectorizer Configuration ────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizeConfig {
    pub input:    String,
    /// Recorded in the logs; lines are always decoded as UTF-8
    pub encoding: String,
    pub out_dir:  String,
}

impl Default for VectorizeConfig {
    fn default() -> Self {
        Self {
            input:    "BGL.log".to_string(),
            encoding: "utf-8".to_string(),
            out_dir:  "out".to_string(),
        }
    }
}

// ─── Pass 1: CorpusBuilder ───────────────────────────────────────────────────
/// Accumulates the dictionary and template frequencies.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    normalizer:  VectorizerNormalizer,
    dictionary:  TemplateDictionary,
    frequencies: FrequencyTable,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one raw line. Returns None for empty or token-less
    /// lines, which are not documents.
    pub fn observe(&mut self, line: &str) -> Option<TemplateId> {
        if line.is_empty() {
            return None;
        }
        let parsed = self.normalizer.parse(line)?;
        let id     = self.dictionary.assign(parsed.template);
        self.frequencies.record(id);
        Some(id)
    }

    /// Freeze the counts and derive the IDF table
    pub fn finish(self) -> CorpusModel {
        let dim = self.dictionary.len();
        let idf = IdfTable::from_frequencies(&self.frequencies, dim);
        CorpusModel {
            normalizer: self.normalizer,
            dictionary: self.dictionary,
            num_docs:   self.frequencies.num_docs(),
            idf,
        }
    }
}

// ─── Pass 2: CorpusModel ─────────────────────────────────────────────────────
/// Read-only result of pass 1.
#[derive(Debug)]
pub struct CorpusModel {
    normalizer: VectorizerNormalizer,
    dictionary: TemplateDictionary,
    num_docs:   u64,
    idf:        IdfTable,
}

impl CorpusModel {
    pub fn dictionary(&self) -> &TemplateDictionary {
        &self.dictionary
    }

    /// Vocabulary size
    pub fn dim(&self) -> usize {
        self.dictionary.len()
    }

    pub fn meta(&self) -> CorpusMeta {
        CorpusMeta::new(self.num_docs, self.dim())
    }

    /// Encode one raw line. None for lines pass 1 skipped too.
    pub fn encode(&self, line_id: u64, line: &str) -> Option<VectorRecord> {
        if line.is_empty() {
            return None;
        }
        let parsed = self.normalizer.parse(line)?;
        let dim    = self.dim();

        let resolved = self
            .dictionary
            .get(parsed.template.as_str())
            .and_then(|id| self.idf.weight(id).map(|w| (id, w)));

        Some(match resolved {
            Some((id, weight)) => VectorRecord::resolved(line_id, parsed.alert_tag, id, weight, dim),
            None => VectorRecord::unresolved(line_id, parsed.alert_tag, dim),
        })
    }

    /// Encode a whole line stream into JSON lines. Record
    /// `line_id`s count emitted records from 0.
    pub fn encode_all<I, W>(&self, lines: I, out: &mut W, metrics: &mut RunMetrics) -> Result<()>
    where
        I: Iterator<Item = io::Result<String>>,
        W: Write,
    {
        let mut line_id = 0u64;
        for line in lines {
            let line = line.context("Read failed during pass 2")?;
            if let Some(record) = self.encode(line_id, &line) {
                if !record.is_resolved() {
                    metrics.unresolved += 1;
                }
                write_jsonl_record(out, &record)?;
                line_id += 1;
            }
        }
        Ok(())
    }
}

/// Run pass 1 over a line stream
pub fn build_corpus<I>(lines: I, metrics: &mut RunMetrics) -> Result<CorpusModel>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut builder = CorpusBuilder::new();
    for line in lines {
        let line = line.context("Read failed during pass 1")?;
        metrics.lines_read += 1;
        if builder.observe(&line).is_none() {
            metrics.lines_skipped += 1;
        }
    }
    Ok(builder.finish())
}

// ─── VectorizeUseCase ────────────────────────────────────────────────────────
pub struct VectorizeUseCase {
    config: VectorizeConfig,
}

impl VectorizeUseCase {
    pub fn new(config: VectorizeConfig) -> Self {
        Self { config }
    }

    /// Run both passes and write all three artifacts
    pub fn execute(&self) -> Result<RunMetrics> {
        let cfg   = &self.config;
        let input = PathBuf::from(&cfg.input);
        let store = ArtifactStore::new(&cfg.out_dir);
        store.ensure_dir()?;

        tracing::info!("Vectorizing '{}' into '{}'", input.display(), cfg.out_dir);
        if !is_utf8_label(&cfg.encoding) {
            tracing::warn!(
                "Encoding label '{}' is not UTF-8; lines are decoded as UTF-8 with replacement",
                cfg.encoding
            );
        }

        let mut metrics = RunMetrics::new(Pipeline::Vectorize);

        // ── Pass 1: dictionary, frequencies, IDF ──────────────────────────────
        let model = build_corpus(open_input(&input)?, &mut metrics)?;
        metrics.num_docs  = model.meta().num_docs;
        metrics.templates = model.dim();
        tracing::info!(
            "Pass 1 done: {} documents, {} templates",
            metrics.num_docs,
            metrics.templates
        );

        store.write_catalog(model.dictionary())?;
        store.write_meta(&model.meta())?;

        // ── Pass 2: one vector per line ───────────────────────────────────────
        let mut out = store.create_vectors()?;
        model.encode_all(open_input(&input)?, &mut out, &mut metrics)?;
        out.commit()?;
        tracing::info!("Pass 2 done: '{}'", store.path(VECTORS_FILE).display());

        metrics.log();
        Ok(metrics)
    }
}

fn open_input(path: &Path) -> Result<LineReader<BufReader<File>>> {
    open_lines(path).map_err(|source| {
        MinerError::InputUnavailable {
            path: path.to_path_buf(),
            source,
        }
        .into()
    })
}

fn is_utf8_label(label: &str) -> bool {
    matches!(label.to_ascii_lowercase().as_str(), "utf-8" | "utf8")
}
