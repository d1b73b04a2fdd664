// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// Everything that touches the output side of the filesystem:
//
//   atomic.rs      - temp-file-then-rename writer shared by all
//                    artifacts
//
//   checkpoint.rs  - aggregation dictionary snapshots
//                    (dict_templ.csv), written on growth only,
//                    and read back for inspection
//
//   artifacts.rs   - vectorizer outputs (templates.json,
//                    meta.json, vectors.jsonl) and their
//                    read paths
//
//   tfidf_store.rs - fitted template TF-IDF model (tfidf.json),
//                    fitted once and reloaded afterwards
//
//   metrics.rs     - per-run counters and the summary line
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Atomic replace-on-commit file writer
pub mod atomic;

/// Dictionary snapshot writing and loading
pub mod checkpoint;

/// Vectorizer artifact store
pub mod artifacts;

/// Template TF-IDF model persistence
pub mod tfidf_store;

/// Run counters
pub mod metrics;
