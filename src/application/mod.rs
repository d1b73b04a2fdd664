// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// Each use case coordinates the other layers to get one job done.
//
// Rules for this layer:
//   - No normalization rules here (that's Layer 4)
//   - No printing here (that's Layer 1)
//   - No file formats here (that's Layer 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Pipeline A: incremental, checkpointed dictionary builder
pub mod aggregate_use_case;

// Pipeline B: two-pass template vectorizer
pub mod vectorize_use_case;

// Read-only inspection of finished runs
pub mod inspect_use_case;

// TF-IDF vectors for the templates of an aggregation snapshot
pub mod template_vectors_use_case;
