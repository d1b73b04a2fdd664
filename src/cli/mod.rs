// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// use case in Layer 2. This layer prints results; it never
// computes them.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{
    AggregateArgs, Commands, StatusArgs, TemplateVectorsArgs, TemplatesArgs, VectorizeArgs, VectorsArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "logminer",
    version,
    about = "Mine canonical log templates and encode log lines as sparse IDF vectors."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Aggregate(args) => run_aggregate(args),
            Commands::Vectorize(args) => run_vectorize(args),
            Commands::Templates(args) => run_templates(args),
            Commands::Status(args) => run_status(args),
            Commands::Vectors(args) => run_vectors(args),
            Commands::TemplateVectors(args) => run_template_vectors(args),
        }
    }
}

fn run_aggregate(args: AggregateArgs) -> Result<()> {
    use crate::application::aggregate_use_case::AggregateUseCase;

    let metrics = AggregateUseCase::new(args.into()).execute()?;
    println!("Done! {metrics}");
    Ok(())
}

fn run_vectorize(args: VectorizeArgs) -> Result<()> {
    use crate::application::vectorize_use_case::VectorizeUseCase;

    let metrics = VectorizeUseCase::new(args.into()).execute()?;
    println!("[OK] {metrics}");
    Ok(())
}

fn run_templates(args: TemplatesArgs) -> Result<()> {
    use crate::application::inspect_use_case::snapshot_templates;

    let entries = snapshot_templates(&args.snapshot)?;
    for e in &entries {
        println!("{}\t{}", e.id, e.template);
    }
    tracing::info!("{} templates in '{}'", entries.len(), args.snapshot);
    Ok(())
}

fn run_status(args: StatusArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let status = InspectUseCase::new(&args.out_dir).status();
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn run_vectors(args: VectorsArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let batch = InspectUseCase::new(&args.out_dir).vectors(args.offset, args.limit)?;
    println!("{}", serde_json::to_string(&batch)?);
    Ok(())
}

fn run_template_vectors(args: TemplateVectorsArgs) -> Result<()> {
    use crate::application::template_vectors_use_case::TemplateVectorsUseCase;

    let batch = TemplateVectorsUseCase::new(args.into()).execute()?;
    println!("{}", serde_json::to_string(&batch)?);
    Ok(())
}
