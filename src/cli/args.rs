//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, cost::CostArgs, init::InitArgs,
    price::PriceArgs, quantities::QuantitiesArgs, summary::SummaryArgs,
};

#[derive(Parser)]
#[command(name = "partcost")]
#[command(author, version, about = "Cabinet parts costing")]
#[command(long_about = "Turns the tab-delimited parts export of a cabinet design tool into quantities per part, a summary per type, door model and colour, and a costed bill of materials.")]
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

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .partcost/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new partcost project
    Init(InitArgs),

    /// Show the computed quantity of every part
    Quantities(QuantitiesArgs),

    /// Show quantities grouped by type, door model and colour
    Summary(SummaryArgs),

    /// Price the grouped quantities and optionally export them
    Cost(CostArgs),

    /// Price table management
    Price(PriceArgs),

    /// List the quantity formulas in the order they are tried
    Rules,

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Use the configured default, falling back to tsv
    #[default]
    Auto,
    /// Aligned columns (for reading and piping)
    Tsv,
    /// CSV format (for spreadsheets)
    Csv,
    /// JSON format (for programming)
    Json,
    /// Markdown tables
    Md,
}
