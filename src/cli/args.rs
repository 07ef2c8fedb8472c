//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, eval::EvalArgs, export::ExportArgs, init::InitArgs,
    nest::NestArgs, price::PriceArgs, resolve::ResolveArgs, weigh::WeighArgs,
};

#[derive(Parser)]
#[command(name = "cabest")]
#[command(author, version, about = "Cabinet cost, weight and sheet-nesting estimator")]
#[command(long_about = "Prices and weighs parametric cabinets from part formulas and a rate catalog, and estimates how many stock sheets a job ships on.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .cabest/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new catalog project with sample data
    Init(InitArgs),

    /// Evaluate a dimension formula
    Eval(EvalArgs),

    /// Resolve part dimensions for a cabinet or job
    Resolve(ResolveArgs),

    /// Price a cabinet or job
    Price(PriceArgs),

    /// Weigh a cabinet or job
    Weigh(WeighArgs),

    /// Estimate sheets and shipping packages for a cabinet or job
    Nest(NestArgs),

    /// Export resolved parts and hardware as CSV
    Export(ExportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
    /// Markdown tables
    Md,
}
