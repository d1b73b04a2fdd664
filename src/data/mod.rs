// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// Everything between raw bytes on disk and template IDs:
//
//   *.log files
//       │
//       ▼
//   LogDirLoader / LineReader  → file list, streamed lines
//       │
//       ▼
//   LineBatcher                → fixed-size line batches (pipeline A)
//       │
//       ▼
//   Normalizers                → canonical templates (policy A or B)
//       │
//       ▼
//   FrequencyTable / IdfTable  → corpus statistics (pipeline B)
//
//   TfidfModel                 → word n-gram vectors for the
//                                templates of a snapshot
//
// Each module does one step and is tested on its own.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Lists log files and streams their lines
pub mod loader;

/// The two line → template normalization policies
pub mod normalizer;

/// Fixed-size line batches and per-batch template dedup
pub mod batcher;

/// Template frequencies and IDF weights
pub mod stats;

/// Word-level TF-IDF over template texts
pub mod tfidf;
