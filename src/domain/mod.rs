// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust types that describe what the miner works with:
//
//   template.rs      - canonical template strings and their IDs
//   dictionary.rs    - the append-only template -> ID mapping
//   records.rs       - output record shapes (catalog, meta, vectors)
//   traits.rs        - seams the application layer programs against
//
// Rules for this layer:
//   - NO file I/O
//   - NO clap or serde_json calls
//   - Only structs, enums and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Canonical template and its stable integer identity
pub mod template;

// Template dictionary with first-seen ID assignment
pub mod dictionary;

// Catalog, metadata and per-line vector records
pub mod records;

// Core abstractions (traits) that other layers implement
pub mod traits;
