//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "caseqa")]
#[command(
    author,
    version,
    about = "Ask questions about financial regulatory penalty cases"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Directory holding the YAML configuration documents
    #[arg(long, global = true, env = "CASEQA_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    /// Engine configuration document inside the config directory
    #[arg(long, global = true, default_value = "gemini_config.yaml")]
    pub config: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload and import case documents into a new file search store
    Build(BuildArgs),

    /// Ask a question
    Query(QueryArgs),

    /// Show engine and index status
    Status,

    /// Show usage help and example questions
    Info,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Directory containing the case documents [default: app.source_dir from config.yaml]
    pub source_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Question text
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Override the configured temperature
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Override the configured output token limit
    #[arg(long)]
    pub max_output_tokens: Option<u32>,

    /// Override the configured system instruction
    #[arg(long)]
    pub system: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
    Md,
}
