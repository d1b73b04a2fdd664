// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Subcommands:
//   aggregate  <SOURCE_DIR> <DEST_DIR>         pipeline A
//   vectorize  <INPUT> <ENCODING> <OUT_DIR>    pipeline B
//   templates  <SNAPSHOT>                      read a pipeline A snapshot
//   status     <OUT_DIR>                       pipeline B artifact status
//   vectors    <OUT_DIR> [--offset] [--limit]  window of pipeline B vectors
//   template-vectors <OUT_DIR> [--offset] [--limit] [tf-idf options]
//                                              TF-IDF rows for a snapshot
//
// clap's derive macros generate help text, usage errors and
// type conversion for every field below.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::{
    aggregate_use_case::AggregateConfig,
    inspect_use_case::DEFAULT_VECTOR_LIMIT,
    template_vectors_use_case::{TemplateVectorsConfig, DEFAULT_ROW_LIMIT},
    vectorize_use_case::VectorizeConfig,
};
use crate::data::{
    batcher::{InsertionOrder, DEFAULT_BATCH_SIZE},
    tfidf::{DocFreq, TfidfParams, DEFAULT_MAX_FEATURES},
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a template dictionary from every *.log file in a directory
    Aggregate(AggregateArgs),

    /// Build templates and IDF weights from one log, then emit a vector per line
    Vectorize(VectorizeArgs),

    /// Print the entries of a dict_templ.csv snapshot
    Templates(TemplatesArgs),

    /// Report whether a vectorize output directory is complete
    Status(StatusArgs),

    /// Print a window of vector records as JSON
    Vectors(VectorsArgs),

    /// Print TF-IDF vectors for a window of dict_templ.csv templates as JSON
    TemplateVectors(TemplateVectorsArgs),
}

/// Tie-break for templates first seen in the same batch
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OrderArg {
    /// Ascending byte order of the template text
    Lexicographic,
    /// Order of first appearance within the batch
    FirstSeen,
}

impl From<OrderArg> for InsertionOrder {
    fn from(o: OrderArg) -> Self {
        match o {
            OrderArg::Lexicographic => InsertionOrder::Lexicographic,
            OrderArg::FirstSeen => InsertionOrder::FirstSeen,
        }
    }
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Directory holding the *.log files (not searched recursively)
    pub source_dir: String,

    /// Directory receiving dict_templ.csv; created if missing
    pub dest_dir: String,

    /// Lines per batch; the snapshot is rewritten at most once per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// ID order for templates that are new in the same batch
    #[arg(long, value_enum, default_value_t = OrderArg::Lexicographic)]
    pub order: OrderArg,
}

/// The application layer never sees clap types.
impl From<AggregateArgs> for AggregateConfig {
    fn from(a: AggregateArgs) -> Self {
        AggregateConfig {
            source_dir: a.source_dir,
            dest_dir:   a.dest_dir,
            batch_size: a.batch_size,
            order:      a.order.into(),
        }
    }
}

#[derive(Args, Debug)]
pub struct VectorizeArgs {
    /// Log file to vectorize; read twice
    pub input: String,

    /// Encoding label of the input (informational)
    pub encoding: String,

    /// Directory receiving templates.json, meta.json and vectors.jsonl
    pub out_dir: String,
}

impl From<VectorizeArgs> for VectorizeConfig {
    fn from(a: VectorizeArgs) -> Self {
        VectorizeConfig {
            input:    a.input,
            encoding: a.encoding,
            out_dir:  a.out_dir,
        }
    }
}

#[derive(Args, Debug)]
pub struct TemplatesArgs {
    /// Path to a dict_templ.csv snapshot
    pub snapshot: String,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// A vectorize output directory
    pub out_dir: String,
}

#[derive(Args, Debug)]
pub struct VectorsArgs {
    /// A vectorize output directory
    pub out_dir: String,

    /// First line of vectors.jsonl to return
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Maximum number of lines to return
    #[arg(long, default_value_t = DEFAULT_VECTOR_LIMIT)]
    pub limit: u64,
}

#[derive(Args, Debug)]
pub struct TemplateVectorsArgs {
    /// An aggregate destination directory holding dict_templ.csv
    pub out_dir: String,

    /// First template (by ID order) to return
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Maximum number of templates to return
    #[arg(long, default_value_t = DEFAULT_ROW_LIMIT)]
    pub limit: usize,

    /// Keep only the most frequent terms
    #[arg(long, default_value_t = DEFAULT_MAX_FEATURES)]
    pub max_features: usize,

    /// Shortest n-gram, in words
    #[arg(long, default_value_t = 1)]
    pub ngram_min: usize,

    /// Longest n-gram, in words
    #[arg(long, default_value_t = 2)]
    pub ngram_max: usize,

    /// Minimum document frequency: a count ("2") or a fraction ("0.01")
    #[arg(long, default_value = "1")]
    pub min_df: DocFreq,

    /// Maximum document frequency: a count ("500") or a fraction ("0.95")
    #[arg(long, default_value = "1.0")]
    pub max_df: DocFreq,
}

impl From<TemplateVectorsArgs> for TemplateVectorsConfig {
    fn from(a: TemplateVectorsArgs) -> Self {
        TemplateVectorsConfig {
            out_dir: a.out_dir,
            offset:  a.offset,
            limit:   a.limit,
            tfidf:   TfidfParams {
                max_features: Some(a.max_features),
                ngram_range:  (a.ngram_min, a.ngram_max),
                min_df:       a.min_df,
                max_df:       a.max_df,
            },
        }
    }
}
