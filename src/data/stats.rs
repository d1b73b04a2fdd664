// ============================================================
// Layer 4: Corpus Statistics
// ============================================================
// Per-template line counts and the IDF weights derived from them.
//
// Each line maps to exactly one template, so a template's count
// is both its document frequency and its term frequency:
//
//   idf[i] = ln(num_docs / df[i])
//
//   num_docs = 10, df = 2   →   idf = ln 5 ≈ 1.609
//
// The IDF table is computed once after the counting pass and
// never changes afterwards.
//
// Reference: vvylym-aprender incremental_idf (document frequency
//            bookkeeping), without smoothing or decay

use crate::domain::template::TemplateId;

// ─── FrequencyTable ───────────────────────────────────────────────────────────
/// Line count per template ID, plus the total line count.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    counts:   Vec<u64>,
    num_docs: u64,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one line whose template is `id`
    pub fn record(&mut self, id: TemplateId) {
        let i = id.index();
        if i >= self.counts.len() {
            self.counts.resize(i + 1, 0);
        }
        self.counts[i] += 1;
        self.num_docs  += 1;
    }

    /// Lines counted for `id`; 0 if never recorded
    pub fn count(&self, id: TemplateId) -> u64 {
        self.counts.get(id.index()).copied().unwrap_or(0)
    }

    /// Total lines recorded
    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }
}

// ─── IdfTable ─────────────────────────────────────────────────────────────────
/// One IDF weight per template ID in `[0, dim)`.
#[derive(Debug, Clone, PartialEq)]
pub struct IdfTable {
    weights: Vec<f64>,
}

impl IdfTable {
    /// Derive weights for IDs `0..dim`. A missing count is taken
    /// as 1 so the weight stays finite.
    pub fn from_frequencies(freq: &FrequencyTable, dim: usize) -> Self {
        let num_docs = freq.num_docs() as f64;
        let weights  = (0..dim)
            .map(|i| {
                let df = match freq.count(TemplateId::new(i)) {
                    0 => 1,
                    n => n,
                };
                (num_docs / df as f64).ln()
            })
            .collect();
        Self { weights }
    }

    pub fn weight(&self, id: TemplateId) -> Option<f64> {
        self.weights.get(id.index()).copied()
    }
}
