//! caseqa CLI
//!
//! Question answering over financial regulatory penalty cases.

use anyhow::Result;
use caseqa_core::{CaseQaError, ConfigLoader};
use clap::Parser;

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        let code = e
            .downcast_ref::<CaseQaError>()
            .map(CaseQaError::exit_code)
            .unwrap_or(caseqa_core::error::exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let loader = ConfigLoader::new(&cli.config_dir);

    match cli.command {
        Commands::Build(args) => commands::build::run(args, &loader, &cli.config, cli.format).await,
        Commands::Query(args) => commands::query::run(args, &loader, &cli.config, cli.format).await,
        Commands::Status => commands::status::run(&loader, &cli.config, cli.format).await,
        Commands::Info => commands::info::run(&loader, cli.format),
    }
}
