//! Build command

use super::open_engine;
use crate::app::{BuildArgs, OutputFormat};
use crate::progress::ProgressReporter;
use anyhow::Result;
use caseqa_core::{CaseQaError, ConfigLoader, IngestPhase};

pub async fn run(
    args: BuildArgs,
    loader: &ConfigLoader,
    config_name: &str,
    format: OutputFormat,
) -> Result<()> {
    let source_dir = match args.source_dir {
        Some(dir) => dir,
        None => loader.app_config()?.source_dir.ok_or_else(|| {
            CaseQaError::InvalidInput(
                "no source directory given and app.source_dir is not set in config.yaml"
                    .to_string(),
            )
        })?,
    };
    if !source_dir.is_dir() {
        anyhow::bail!("Source directory not found: {}", source_dir.display());
    }

    let mut engine = open_engine(loader, config_name)?;

    let progress = ProgressReporter::new();
    let callback: &(dyn Fn(IngestPhase, usize, usize) + Send + Sync) =
        &|phase, done, total| progress.update(phase, done, total);

    let report = engine
        .build_index_with_progress(&source_dir, Some(callback))
        .await?;
    progress.finish(report.imported(), report.found);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("Store:      {}", report.store_resource_name);
            println!("Found:      {}", report.found);
            println!("Uploaded:   {}/{}", report.uploaded(), report.found);
            println!("Imported:   {}", report.imported());
            println!("Elapsed:    {:.1}s", report.elapsed.as_secs_f64());

            let failures: Vec<_> = report.failures().collect();
            if !failures.is_empty() {
                println!();
                println!("Failed files:");
                for outcome in failures {
                    println!("  {}: {}", outcome.display_name, outcome.status);
                }
            }
        }
    }
    Ok(())
}
