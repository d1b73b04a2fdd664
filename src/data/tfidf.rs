// ============================================================
// Layer 4: Word-Level TF-IDF over Templates
// ============================================================
// Fits a bag-of-n-grams TF-IDF model over the template texts of
// an aggregation snapshot and turns any text into a dense,
// unit-length vector over the fitted vocabulary.
//
//   "disk failure on sda"
//       │  lowercase, words of 2+ word characters
//       ▼
//   disk, failure, on, sda, disk failure, failure on, on sda
//       │  keep terms with min_df <= df <= max_df,
//       │  then the max_features most frequent
//       ▼
//   vocabulary (sorted)  +  idf[t] = ln((1 + n) / (1 + df[t])) + 1
//       │
//       ▼
//   v[t] = count(t) * idf[t],  then v / |v|
//
// Document-frequency bounds are either absolute counts ("2") or
// fractions of the corpus ("0.95").
//
// Reference: Rust Book §8 (HashMap), §13 (Iterators)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, str::FromStr};

use crate::error::MinerError;

/// Feature cap used when none is configured
pub const DEFAULT_MAX_FEATURES: usize = 20_000;

// ─── Parameters ───────────────────────────────────────────────────────────────
/// A document-frequency bound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocFreq {
    /// Absolute number of documents
    Count(usize),
    /// Share of all documents, in [0, 1]
    Fraction(f64),
}

impl DocFreq {
    /// Bound expressed in documents for a corpus of `num_docs`
    fn docs(self, num_docs: usize) -> f64 {
        match self {
            DocFreq::Count(c) => c as f64,
            DocFreq::Fraction(f) => f * num_docs as f64,
        }
    }
}

/// "3" is a count, "0.5" or "1e-1" a fraction
impl FromStr for DocFreq {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.contains(|c| matches!(c, '.' | 'e' | 'E')) {
            s.parse().map(DocFreq::Fraction).map_err(|e| format!("'{s}': {e}"))
        } else {
            s.parse().map(DocFreq::Count).map_err(|e| format!("'{s}': {e}"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfParams {
    /// Keep at most this many terms, the most frequent ones
    pub max_features: Option<usize>,
    /// Smallest and largest n-gram length, inclusive
    pub ngram_range:  (usize, usize),
    pub min_df:       DocFreq,
    pub max_df:       DocFreq,
}

impl Default for TfidfParams {
    fn default() -> Self {
        Self {
            max_features: Some(DEFAULT_MAX_FEATURES),
            ngram_range:  (1, 2),
            min_df:       DocFreq::Count(1),
            max_df:       DocFreq::Fraction(1.0),
        }
    }
}

impl TfidfParams {
    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(invalid(format!("n-gram range ({lo}, {hi}) must satisfy 1 <= min <= max")));
        }
        if self.max_features == Some(0) {
            return Err(invalid("max_features must be at least 1".into()));
        }
        for (name, bound) in [("min_df", self.min_df), ("max_df", self.max_df)] {
            if let DocFreq::Fraction(f) = bound {
                if !(0.0..=1.0).contains(&f) {
                    return Err(invalid(format!("{name} fraction {f} is outside [0, 1]")));
                }
            }
        }
        Ok(())
    }
}

fn invalid(msg: String) -> anyhow::Error {
    MinerError::InvalidConfig(msg).into()
}

// ─── Analyzer ─────────────────────────────────────────────────────────────────
/// Terms of a text: lowercased words of two or more word
/// characters, then every n-gram of them within `ngram_range`.
pub fn analyze(text: &str, ngram_range: (usize, usize)) -> Vec<String> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= 2)
        .collect();

    let (lo, hi) = (ngram_range.0.max(1), ngram_range.1.min(words.len()));
    let mut terms = Vec::new();
    for n in lo..=hi {
        terms.extend(words.windows(n).map(|w| w.join(" ")));
    }
    terms
}

fn term_counts(text: &str, ngram_range: (usize, usize)) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for term in analyze(text, ngram_range) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

// ─── Model ────────────────────────────────────────────────────────────────────
/// A fitted vocabulary with one IDF weight per term.
/// Term `i` of the sorted vocabulary is dimension `i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TfidfFile", into = "TfidfFile")]
pub struct TfidfModel {
    params:     TfidfParams,
    vocabulary: Vec<String>,
    idf:        Vec<f64>,
    index:      HashMap<String, usize>,
}

/// On-disk form of a model; the term index is rebuilt on load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfFile {
    pub params:     TfidfParams,
    pub vocabulary: Vec<String>,
    pub idf:        Vec<f64>,
}

impl TryFrom<TfidfFile> for TfidfModel {
    type Error = String;

    fn try_from(file: TfidfFile) -> std::result::Result<Self, Self::Error> {
        if file.vocabulary.len() != file.idf.len() {
            return Err(format!(
                "{} terms but {} idf weights",
                file.vocabulary.len(),
                file.idf.len()
            ));
        }
        Ok(TfidfModel::from_parts(file.params, file.vocabulary, file.idf))
    }
}

impl From<TfidfModel> for TfidfFile {
    fn from(model: TfidfModel) -> Self {
        Self {
            params:     model.params,
            vocabulary: model.vocabulary,
            idf:        model.idf,
        }
    }
}

impl TfidfModel {
    fn from_parts(params: TfidfParams, vocabulary: Vec<String>, idf: Vec<f64>) -> Self {
        let index = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { params, vocabulary, idf, index }
    }

    /// Learn the vocabulary and IDF weights of `docs`
    pub fn fit<S: AsRef<str>>(docs: &[S], params: TfidfParams) -> Result<Self> {
        params.validate()?;

        let num_docs = docs.len();
        let low      = params.min_df.docs(num_docs);
        let high     = params.max_df.docs(num_docs);
        if high < low {
            return Err(invalid("max_df corresponds to fewer documents than min_df".into()));
        }

        // term -> (document frequency, total count)
        let mut stats: HashMap<String, (usize, u64)> = HashMap::new();
        for doc in docs {
            for (term, count) in term_counts(doc.as_ref(), params.ngram_range) {
                let entry = stats.entry(term).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += count;
            }
        }

        let mut kept: Vec<(String, usize, u64)> = stats
            .into_iter()
            .filter(|(_, (df, _))| (*df as f64) >= low && (*df as f64) <= high)
            .map(|(term, (df, tf))| (term, df, tf))
            .collect();

        if let Some(limit) = params.max_features {
            if kept.len() > limit {
                // most frequent first, ties by term
                kept.sort_unstable_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
                kept.truncate(limit);
            }
        }
        if kept.is_empty() {
            bail!("No terms remain after pruning; the templates are empty or the df bounds are too tight");
        }

        kept.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let idf = kept
            .iter()
            .map(|(_, df, _)| ((1 + num_docs) as f64 / (1 + df) as f64).ln() + 1.0)
            .collect();
        let vocabulary = kept.into_iter().map(|(term, _, _)| term).collect();

        Ok(Self::from_parts(params, vocabulary, idf))
    }

    /// Unit-length TF-IDF vector of `text`. Terms outside the
    /// vocabulary are ignored; a text with none gives all zeros.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut v = vec![0.0; self.dim()];
        for (term, count) in term_counts(text, self.params.ngram_range) {
            if let Some(&i) = self.index.get(&term) {
                v[i] = count as f64 * self.idf[i];
            }
        }

        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }

    pub fn dim(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn params(&self) -> &TfidfParams {
        &self.params
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::exit_code_for;

    fn unigrams() -> TfidfParams {
        TfidfParams {
            ngram_range: (1, 1),
            ..TfidfParams::default()
        }
    }

    #[test]
    fn test_analyze_words_then_bigrams() {
        assert_eq!(
            analyze("Disk failure on sda", (1, 2)),
            vec!["disk", "failure", "on", "sda", "disk failure", "failure on", "on sda"]
        );
    }

    #[test]
    fn test_analyze_drops_single_characters() {
        // "a" and "x" are too short, so "cd ef" is the only bigram
        assert_eq!(analyze("a cd x ef", (1, 2)), vec!["cd", "ef", "cd ef"]);
        assert!(analyze("", (1, 2)).is_empty());
    }

    #[test]
    fn test_vocabulary_is_sorted_with_smooth_idf() {
        let model = TfidfModel::fit(&["disk failure", "disk ok"], unigrams()).unwrap();
        assert_eq!(model.vocabulary(), ["disk", "failure", "ok"]);

        // disk is in every document: ln(3/3) + 1
        let v = model.transform("disk");
        assert_eq!(v, vec![1.0, 0.0, 0.0]);
        assert!((model.idf[1] - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_transform_is_unit_length() {
        let model = TfidfModel::fit(&["disk failure", "link up", "disk ok"], TfidfParams::default()).unwrap();
        let v     = model.transform("disk failure");
        let norm  = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(v[model.index["disk failure"]] > 0.0);
    }

    #[test]
    fn test_unknown_text_is_all_zeros() {
        let model = TfidfModel::fit(&["disk failure"], unigrams()).unwrap();
        assert_eq!(model.transform("fan slow"), vec![0.0, 0.0]);
    }

    #[test]
    fn test_df_bounds_prune_terms() {
        let docs = ["disk failure", "disk ok", "link up"];

        let common_only = TfidfParams {
            min_df: DocFreq::Count(2),
            ..unigrams()
        };
        assert_eq!(TfidfModel::fit(&docs, common_only).unwrap().vocabulary(), ["disk"]);

        let rare_only = TfidfParams {
            max_df: DocFreq::Fraction(0.5),
            ..unigrams()
        };
        assert_eq!(
            TfidfModel::fit(&docs, rare_only).unwrap().vocabulary(),
            ["failure", "link", "ok", "up"]
        );
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let params = TfidfParams {
            max_features: Some(2),
            ..unigrams()
        };
        // disk: 3, fan: 2, ok: 1
        let model = TfidfModel::fit(&["disk disk fan", "disk fan ok"], params).unwrap();
        assert_eq!(model.vocabulary(), ["disk", "fan"]);
    }

    #[test]
    fn test_inconsistent_bounds_are_config_errors() {
        let params = TfidfParams {
            min_df: DocFreq::Count(3),
            max_df: DocFreq::Count(1),
            ..unigrams()
        };
        let err = TfidfModel::fit(&["disk"], params).unwrap_err();
        assert_eq!(exit_code_for(&err), 1);

        let params = TfidfParams {
            ngram_range: (2, 1),
            ..TfidfParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_empty_corpus_cannot_be_fitted() {
        assert!(TfidfModel::fit::<&str>(&[], TfidfParams::default()).is_err());
        assert!(TfidfModel::fit(&["a b c"], TfidfParams::default()).is_err());
    }

    #[test]
    fn test_doc_freq_parsing() {
        assert_eq!("2".parse::<DocFreq>(), Ok(DocFreq::Count(2)));
        assert_eq!("0.5".parse::<DocFreq>(), Ok(DocFreq::Fraction(0.5)));
        assert_eq!("1.0".parse::<DocFreq>(), Ok(DocFreq::Fraction(1.0)));
        assert!("many".parse::<DocFreq>().is_err());
    }

    #[test]
    fn test_stored_form_rebuilds_the_index() {
        let model = TfidfModel::fit(&["disk failure", "link up"], TfidfParams::default()).unwrap();
        let json  = serde_json::to_string(&model).unwrap();
        let back: TfidfModel = serde_json::from_str(&json).unwrap();

        assert_eq!(back.params(), model.params());
        assert_eq!(back.transform("link up"), model.transform("link up"));
    }

    #[test]
    fn test_stored_form_with_mismatched_lengths_is_rejected() {
        let json = r#"{"params":{"max_features":null,"ngram_range":[1,1],"min_df":1,"max_df":1.0},
                      "vocabulary":["disk"],"idf":[]}"#;
        assert!(serde_json::from_str::<TfidfModel>(json).is_err());
    }
}
