// ============================================================
// Layer 4: Line Batcher
// ============================================================
// Groups a stream of lines into fixed-size batches and reduces
// each batch to the distinct templates it contains.
//
//   lines ──► LineBatcher ──► [10 000 lines] ──► unique_templates
//                                                    │
//                                                    ▼
//                                          distinct templates in
//                                          insertion order
//
// Insertion order decides which of several templates that are
// new in the same batch gets the lower ID:
//   - Lexicographic: ascending byte order of the template text
//   - FirstSeen:     order of first appearance inside the batch
//
// Reference: Rust Book §8 (Collections)
//            Rust Book §13 (Iterators)

use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashSet},
    io,
};

use crate::data::normalizer::AggregationNormalizer;
use crate::domain::template::Template;

/// Lines per batch unless configured otherwise
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Order in which a batch's distinct templates reach the dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsertionOrder {
    #[default]
    Lexicographic,
    FirstSeen,
}

// ─── LineBatcher ──────────────────────────────────────────────────────────────
/// Iterator adapter yielding `batch_size` lines at a time.
///
/// The final batch may be shorter. A read error ends the stream:
/// lines read before it are yielded first, then the error.
pub struct LineBatcher<I> {
    lines:       I,
    batch_size:  usize,
    pending_err: Option<io::Error>,
    done:        bool,
}

impl<I> LineBatcher<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    /// `batch_size` of 0 is treated as 1
    pub fn new(lines: I, batch_size: usize) -> Self {
        Self {
            lines,
            batch_size: batch_size.max(1),
            pending_err: None,
            done: false,
        }
    }
}

impl<I> Iterator for LineBatcher<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.pending_err.take() {
            self.done = true;
            return Some(Err(e));
        }
        if self.done {
            return None;
        }

        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match self.lines.next() {
                Some(Ok(line)) => batch.push(line),
                Some(Err(e)) => {
                    self.pending_err = Some(e);
                    break;
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if batch.is_empty() {
            // Either the stream ended or the very first read failed
            self.done = true;
            return self.pending_err.take().map(Err);
        }
        Some(Ok(batch))
    }
}

/// Distinct templates of one batch, plus how many of its lines
/// normalized to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchTemplates {
    pub templates:   Vec<Template>,
    pub empty_lines: usize,
}

/// Normalize a batch and return its distinct non-empty templates
/// in the requested insertion order.
pub fn unique_templates(
    batch:      &[String],
    normalizer: &AggregationNormalizer,
    order:      InsertionOrder,
) -> BatchTemplates {
    let normalized: Vec<Template> = batch.iter().filter_map(|line| normalizer.normalize(line)).collect();
    let empty_lines = batch.len() - normalized.len();

    let templates = match order {
        InsertionOrder::Lexicographic => normalized.into_iter().collect::<BTreeSet<_>>().into_iter().collect(),
        InsertionOrder::FirstSeen => {
            let mut seen   = HashSet::new();
            let mut unique = Vec::new();
            for t in normalized {
                if seen.insert(t.clone()) {
                    unique.push(t);
                }
            }
            unique
        }
    };

    BatchTemplates { templates, empty_lines }
}
