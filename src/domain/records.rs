// ============================================================
// Layer 3: Output Record Types
// ============================================================
// Logical shapes of everything the pipelines write or read back:
//
//   SnapshotEntry  - one row of the aggregation snapshot
//   TemplateEntry  - one template in the vectorizer catalog
//   CorpusMeta     - corpus-level counts for a vectorizer run
//   VectorRecord   - one sparse vector per input line
//   VectorBatch    - a window of vector records read back
//   ArtifactStatus - whether a vectorizer output dir is complete
//   TemplateVectorBatch - dense TF-IDF rows for snapshot templates
//
// serde derives are here so infra can serialise these without
// the domain layer knowing about the file formats.

use serde::{Deserialize, Serialize};

use crate::domain::template::{Template, TemplateId, UNRESOLVED_TEMPLATE_ID};

/// One `id,template` row of an aggregation snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub id:       usize,
    pub template: String,
}

/// One template of the vectorizer catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub id:     usize,
    pub tokens: Vec<String>,
}

impl TemplateEntry {
    pub fn new(id: TemplateId, template: &Template) -> Self {
        Self {
            id:     id.index(),
            tokens: template.tokens().into_iter().map(str::to_string).collect(),
        }
    }
}

/// Corpus-level summary of a vectorizer run.
/// `vocab_size` and `templates` are always equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusMeta {
    pub num_docs:   u64,
    pub vocab_size: usize,
    pub templates:  usize,
}

impl CorpusMeta {
    pub fn new(num_docs: u64, dim: usize) -> Self {
        Self {
            num_docs,
            vocab_size: dim,
            templates:  dim,
        }
    }
}

/// Sparse vector for one log line.
///
/// `indices` and `values` are parallel lists. They hold a single
/// coordinate when the template resolved and nothing otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub line_id:     u64,
    pub alert_tag:   String,
    pub is_alert:    bool,
    pub template_id: i64,
    pub dim:         usize,
    pub indices:     Vec<usize>,
    pub values:      Vec<f64>,
}

impl VectorRecord {
    /// Record for a line whose template has ID `id` and weight `weight`
    pub fn resolved(line_id: u64, alert_tag: String, id: TemplateId, weight: f64, dim: usize) -> Self {
        Self {
            line_id,
            is_alert: is_alert_tag(&alert_tag),
            alert_tag,
            template_id: id.as_signed(),
            dim,
            indices: vec![id.index()],
            values: vec![weight],
        }
    }

    /// Record for a line whose template was not in the dictionary
    pub fn unresolved(line_id: u64, alert_tag: String, dim: usize) -> Self {
        Self {
            line_id,
            is_alert: is_alert_tag(&alert_tag),
            alert_tag,
            template_id: UNRESOLVED_TEMPLATE_ID,
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.template_id != UNRESOLVED_TEMPLATE_ID
    }
}

/// Alert tag used by non-alert lines
pub const NON_ALERT_TAG: &str = "-";

/// A line is an alert iff its first field is not the "-" sentinel
pub fn is_alert_tag(tag: &str) -> bool {
    tag != NON_ALERT_TAG
}

/// Window of vector records read back from a vectorizer run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorBatch {
    pub start: u64,
    pub end:   u64,
    pub total: Option<u64>,
    pub data:  Vec<VectorRecord>,
}

/// Completeness of a vectorizer output directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactStatus {
    pub built: bool,
    pub meta:  Option<CorpusMeta>,
}

/// One snapshot template with its dense TF-IDF vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVectorRow {
    pub templ_id: usize,
    pub template: String,
    pub vector:   Vec<f64>,
}

/// Window `[start, end)` of the ID-sorted snapshot templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVectorBatch {
    pub start: usize,
    pub end:   usize,
    pub total: usize,
    pub dim:   usize,
    pub rows:  Vec<TemplateVectorRow>,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_flag_follows_tag() {
        assert!(!is_alert_tag("-"));
        assert!(is_alert_tag("KERNDTLB"));
    }

    #[test]
    fn test_resolved_record_has_one_coordinate() {
        let r = VectorRecord::resolved(3, "APPREAD".into(), TemplateId::new(4), 1.5, 9);
        assert!(r.is_alert);
        assert!(r.is_resolved());
        assert_eq!(r.template_id, 4);
        assert_eq!(r.indices, vec![4]);
        assert_eq!(r.values, vec![1.5]);
    }

    #[test]
    fn test_unresolved_record_is_empty() {
        let r = VectorRecord::unresolved(0, "-".into(), 9);
        assert!(!r.is_alert);
        assert!(!r.is_resolved());
        assert_eq!(r.template_id, -1);
        assert!(r.indices.is_empty());
        assert!(r.values.is_empty());
    }

    #[test]
    fn test_catalog_entry_splits_tokens() {
        let t = Template::from_canonical("<*> FetchError <*>");
        let e = TemplateEntry::new(TemplateId::new(2), &t);
        assert_eq!(e.id, 2);
        assert_eq!(e.tokens, vec!["<*>", "FetchError", "<*>"]);
    }

    #[test]
    fn test_meta_dimensions_match() {
        let m = CorpusMeta::new(10, 3);
        assert_eq!(m.vocab_size, m.templates);
    }
}
