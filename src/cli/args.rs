//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    catalog::CatalogCommands, completions::CompletionsArgs, config::ConfigCommands,
    family::FamilyCommands, quote::QuoteCommands,
};

#[derive(Parser)]
#[command(name = "rjq")]
#[command(author, version, about = "Rubber Joint Quoter")]
#[command(long_about = "Rubber Joint Quoter: maintain a catalog of sphere bodies and flanges, and build priced quotations for rubber flexible joints.")]
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

    /// Mirror log output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory holding the product catalog and logs
    #[arg(long, global = true, env = "RJQ_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RJQ_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sphere body catalog (categories and priced models)
    #[command(subcommand)]
    Sphere(FamilyCommands),

    /// Flange catalog (categories and priced models)
    #[command(subcommand)]
    Flange(FamilyCommands),

    /// Whole-catalog operations (show, import, export)
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Quotation building, pricing and reports
    #[command(subcommand)]
    Quote(QuoteCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (aligned table)
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// YAML format
    Yaml,
}
