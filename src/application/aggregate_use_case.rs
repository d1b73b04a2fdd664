// ============================================================
// Layer 2: AggregateUseCase (pipeline A)
// ============================================================
// Builds one template dictionary over every *.log file of a
// directory, checkpointing it whenever it grows:
//
//   Step 1: Validate config, create the destination dir   (Layer 2)
//   Step 2: List *.log files in path order                (Layer 4)
//   Step 3: Stream each file in fixed-size line batches   (Layer 4)
//   Step 4: Normalize + dedup each batch                  (Layer 4)
//   Step 5: Assign IDs to the batch's templates           (Layer 3)
//   Step 6: If any ID was new, rewrite the snapshot       (Layer 6)
//
// A file that cannot be opened, or fails mid-read, is logged and
// skipped; templates it already contributed stay assigned.
//
// Memory is bounded by the batch size, not by the file size.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};

use crate::data::{
    batcher::{unique_templates, InsertionOrder, LineBatcher, DEFAULT_BATCH_SIZE},
    loader::{open_lines, LogDirLoader},
    normalizer::AggregationNormalizer,
};
use crate::domain::{
    dictionary::TemplateDictionary,
    traits::{Checkpointer, LogSource},
};
use crate::error::MinerError;
use crate::infra::{
    checkpoint::SnapshotCheckpointer,
    metrics::{Pipeline, RunMetrics},
};

// ─── Aggregation Configuration ───────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateConfig {
    pub source_dir: String,
    pub dest_dir:   String,
    pub batch_size: usize,
    pub order:      InsertionOrder,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            source_dir: "logs".to_string(),
            dest_dir:   "out".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            order:      InsertionOrder::default(),
        }
    }
}

impl AggregateConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(MinerError::InvalidConfig("batch size must be at least 1".into()).into());
        }
        Ok(())
    }
}

// ─── TemplateAggregator ──────────────────────────────────────────────────────
/// Incremental dictionary builder. Owns the dictionary for the
/// whole run and persists it through `C` after every batch that
/// added at least one template.
pub struct TemplateAggregator<C> {
    dictionary:   TemplateDictionary,
    normalizer:   AggregationNormalizer,
    checkpointer: C,
    batch_size:   usize,
    order:        InsertionOrder,
    metrics:      RunMetrics,
}

impl<C: Checkpointer> TemplateAggregator<C> {
    pub fn new(checkpointer: C, batch_size: usize, order: InsertionOrder) -> Self {
        Self {
            dictionary: TemplateDictionary::new(),
            normalizer: AggregationNormalizer::new(),
            checkpointer,
            batch_size,
            order,
            metrics: RunMetrics::new(Pipeline::Aggregate),
        }
    }

    /// Process every file the source lists, in order
    pub fn run<S: LogSource>(&mut self, source: &S) -> Result<()> {
        for path in source.log_files()? {
            self.metrics.files_seen += 1;
            match self.ingest_file(&path)? {
                Ok(()) => tracing::debug!(
                    "Finished '{}', dictionary holds {} templates",
                    path.display(),
                    self.dictionary().len()
                ),
                Err(e) => {
                    self.metrics.files_skipped += 1;
                    tracing::warn!("Skipping '{}': {}", path.display(), e);
                }
            }
        }
        Ok(())
    }

    /// Feed one file. The outer error is fatal (a checkpoint could
    /// not be written); the inner one means the file was unreadable.
    pub fn ingest_file(&mut self, path: &Path) -> Result<io::Result<()>> {
        let lines = match open_lines(path) {
            Ok(lines) => lines,
            Err(e) => return Ok(Err(e)),
        };
        tracing::info!("Reading '{}'", path.display());
        self.ingest_lines(lines)
    }

    /// Feed a stream of lines, batch by batch
    pub fn ingest_lines<I>(&mut self, lines: I) -> Result<io::Result<()>>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        for batch in LineBatcher::new(lines, self.batch_size) {
            match batch {
                Ok(batch) => {
                    self.ingest_batch(&batch)?;
                }
                Err(e) => return Ok(Err(e)),
            }
        }
        Ok(Ok(()))
    }

    /// Assign IDs to one batch's distinct templates and checkpoint
    /// if the dictionary grew. Returns the number of new templates.
    pub fn ingest_batch(&mut self, batch: &[String]) -> Result<usize> {
        let before = self.dictionary.len();

        let unique = unique_templates(batch, &self.normalizer, self.order);
        for template in unique.templates {
            self.dictionary.assign(template);
        }

        let added = self.dictionary.len() - before;
        self.metrics.batches       += 1;
        self.metrics.lines_read    += batch.len() as u64;
        self.metrics.lines_skipped += unique.empty_lines as u64;

        tracing::debug!(
            "Batch #{}: {} lines, {} new templates",
            self.metrics.batches,
            batch.len(),
            added
        );

        if added > 0 {
            self.checkpointer
                .checkpoint(&self.dictionary)
                .context("Checkpoint failed")?;
            self.metrics.checkpoints += 1;
        }
        Ok(added)
    }

    pub fn dictionary(&self) -> &TemplateDictionary {
        &self.dictionary
    }

    /// Close the run, returning the dictionary and final counters
    pub fn finish(mut self) -> (TemplateDictionary, RunMetrics) {
        self.metrics.templates = self.dictionary.len();
        (self.dictionary, self.metrics)
    }
}

// ─── AggregateUseCase ────────────────────────────────────────────────────────
pub struct AggregateUseCase {
    config: AggregateConfig,
}

impl AggregateUseCase {
    pub fn new(config: AggregateConfig) -> Self {
        Self { config }
    }

    /// Run the aggregation end to end
    pub fn execute(&self) -> Result<RunMetrics> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Destination exists before any file is read ───────────────
        fs::create_dir_all(&cfg.dest_dir)
            .with_context(|| format!("Cannot create directory '{}'", cfg.dest_dir))?;

        // ── Steps 2-6: Stream every file through the aggregator ───────────────
        let source       = LogDirLoader::new(&cfg.source_dir);
        let checkpointer = SnapshotCheckpointer::new(&cfg.dest_dir);
        tracing::info!(
            "Aggregating '{}' → '{}' (batch size {}, {:?} order)",
            cfg.source_dir,
            checkpointer.path().display(),
            cfg.batch_size,
            cfg.order
        );

        let mut aggregator = TemplateAggregator::new(checkpointer, cfg.batch_size, cfg.order);
        aggregator.run(&source)?;

        let (_, metrics) = aggregator.finish();
        metrics.log();
        Ok(metrics)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::checkpoint::{load_snapshot, SNAPSHOT_FILE};
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Keeps every snapshot in memory as (id, template) rows
    #[derive(Default)]
    struct RecordingCheckpointer {
        snapshots: Vec<Vec<(usize, String)>>,
    }

    impl Checkpointer for RecordingCheckpointer {
        fn checkpoint(&mut self, dictionary: &TemplateDictionary) -> Result<()> {
            self.snapshots.push(
                dictionary
                    .iter()
                    .map(|(id, t)| (id.index(), t.as_str().to_string()))
                    .collect(),
            );
            Ok(())
        }
    }

    struct FixedSource(Vec<PathBuf>);

    impl LogSource for FixedSource {
        fn log_files(&self) -> Result<Vec<PathBuf>> {
            Ok(self.0.clone())
        }
    }

    fn lines(v: &[&str]) -> impl Iterator<Item = io::Result<String>> {
        v.iter().map(|s| Ok(s.to_string())).collect::<Vec<_>>().into_iter()
    }

    fn aggregator(batch_size: usize, order: InsertionOrder) -> TemplateAggregator<RecordingCheckpointer> {
        TemplateAggregator::new(RecordingCheckpointer::default(), batch_size, order)
    }

    #[test]
    fn test_digit_variants_share_one_entry() {
        let mut agg = aggregator(10, InsertionOrder::Lexicographic);
        agg.ingest_lines(lines(&["ERROR 123 disk failure", "ERROR 456 disk failure"]))
            .unwrap()
            .unwrap();
        assert_eq!(agg.dictionary().len(), 1);
        assert!(agg.dictionary().get("error disk failure").is_some());
    }

    #[test]
    fn test_same_batch_ties_break_lexicographically() {
        let mut agg = aggregator(10, InsertionOrder::Lexicographic);
        agg.ingest_lines(lines(&["zeta up", "alpha down", "mid way"])).unwrap().unwrap();

        let d = agg.dictionary();
        assert_eq!(d.get("alpha down").map(|i| i.index()), Some(0));
        assert_eq!(d.get("mid way").map(|i| i.index()), Some(1));
        assert_eq!(d.get("zeta up").map(|i| i.index()), Some(2));
    }

    #[test]
    fn test_first_seen_order_option() {
        let mut agg = aggregator(10, InsertionOrder::FirstSeen);
        agg.ingest_lines(lines(&["zeta up", "alpha down", "zeta up"])).unwrap().unwrap();

        let d = agg.dictionary();
        assert_eq!(d.get("zeta up").map(|i| i.index()), Some(0));
        assert_eq!(d.get("alpha down").map(|i| i.index()), Some(1));
    }

    #[test]
    fn test_ids_grow_across_batches_in_first_batch_order() {
        // Batch of 2: "b" lands in batch 1, "a" only in batch 2
        let mut agg = aggregator(2, InsertionOrder::Lexicographic);
        agg.ingest_lines(lines(&["b", "b", "a", "c"])).unwrap().unwrap();

        let d = agg.dictionary();
        assert_eq!(d.get("b").map(|i| i.index()), Some(0));
        assert_eq!(d.get("a").map(|i| i.index()), Some(1));
        assert_eq!(d.get("c").map(|i| i.index()), Some(2));
    }

    #[test]
    fn test_no_checkpoint_without_growth() {
        let mut agg = aggregator(2, InsertionOrder::Lexicographic);
        // batch 1: new, batch 2: nothing new, batch 3: empty-only, batch 4: new
        agg.ingest_lines(lines(&[
            "disk failure",
            "link up",
            "Disk 7 failure",
            "link 8 up",
            "",
            "12 34",
            "abort",
        ]))
        .unwrap()
        .unwrap();

        let (dict, metrics) = agg.finish();
        assert_eq!(metrics.batches, 4);
        assert_eq!(metrics.lines_read, 7);
        // "" and "12 34" normalize to nothing
        assert_eq!(metrics.lines_skipped, 2);
        assert_eq!(metrics.checkpoints, 2);
        assert_eq!(metrics.templates, 3);
        assert_eq!(dict.len(), 3);
    }

    #[test]
    fn test_each_checkpoint_holds_the_whole_dictionary() {
        let mut agg = aggregator(1, InsertionOrder::Lexicographic);
        agg.ingest_lines(lines(&["a", "a", "b"])).unwrap().unwrap();

        let snaps = &agg.checkpointer.snapshots;
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[0], vec![(0, "a".to_string())]);
        assert_eq!(snaps[1], vec![(0, "a".to_string()), (1, "b".to_string())]);
    }

    #[test]
    fn test_read_error_keeps_earlier_templates() {
        let mut agg = aggregator(1, InsertionOrder::Lexicographic);
        let input = vec![
            Ok("kept line".to_string()),
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad sector")),
        ];
        let outcome = agg.ingest_lines(input.into_iter()).unwrap();
        assert!(outcome.is_err());
        assert!(agg.dictionary().get("kept line").is_some());
    }

    #[test]
    fn test_unopenable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.log");
        fs::write(&good, "disk failure\n").unwrap();
        let missing = dir.path().join("missing.log");

        let mut agg = aggregator(10, InsertionOrder::Lexicographic);
        agg.run(&FixedSource(vec![missing, good])).unwrap();

        let (dict, metrics) = agg.finish();
        assert_eq!(metrics.files_seen, 2);
        assert_eq!(metrics.files_skipped, 1);
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let cfg = AggregateConfig {
            batch_size: 0,
            ..AggregateConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_use_case_writes_snapshot_and_is_deterministic() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("a.log"), "ERROR 1 disk failure\nlink up\n\n").unwrap();
        fs::write(src.path().join("b.log"), "ERROR 2 disk failure\nfan \"slow\"\n").unwrap();
        fs::write(src.path().join("ignored.txt"), "never read\n").unwrap();

        let run = |dest: &Path| {
            let cfg = AggregateConfig {
                source_dir: src.path().to_string_lossy().into_owned(),
                dest_dir:   dest.to_string_lossy().into_owned(),
                ..AggregateConfig::default()
            };
            AggregateUseCase::new(cfg).execute().unwrap();
            fs::read(dest.join(SNAPSHOT_FILE)).unwrap()
        };

        let out = TempDir::new().unwrap();
        let first  = run(&out.path().join("one"));
        let second = run(&out.path().join("two"));
        assert_eq!(first, second);

        let entries = load_snapshot(&out.path().join("one").join(SNAPSHOT_FILE)).unwrap();
        let templates: Vec<&str> = entries.iter().map(|e| e.template.as_str()).collect();
        assert_eq!(templates, vec!["error disk failure", "link up", "fan slow"]);
    }
}
