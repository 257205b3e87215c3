//! Status command

use super::open_engine;
use crate::app::OutputFormat;
use anyhow::Result;
use caseqa_core::{ConfigLoader, EngineStatus, IndexInfo, RagEngine};
use serde::Serialize;

#[derive(Serialize)]
struct StatusOutput {
    engine: EngineStatus,
    index: IndexInfo,
}

pub async fn run(loader: &ConfigLoader, config_name: &str, format: OutputFormat) -> Result<()> {
    let mut engine = open_engine(loader, config_name)?;
    engine.load_collection_pointer();

    let output = StatusOutput {
        engine: engine.status(),
        index: engine.get_index_info(),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            println!("Engine:          {}", output.engine.engine_name);
            println!("Model:           {}", output.engine.model);
            println!("Initialized:     {}", output.engine.initialized);
            println!();

            let index = &output.index;
            if index.exists {
                println!("Index ready");
                println!("  Files:         {}", index.total_files.unwrap_or(0));
                println!(
                    "  Created:       {}",
                    index.created_time.as_deref().unwrap_or("unknown")
                );
                println!("  Age:           {:.1}h", index.age_hours.unwrap_or(0.0));
                println!(
                    "  Store:         {}",
                    index.store_resource_name.as_deref().unwrap_or("unknown")
                );
            } else {
                println!("Index not built");
                if let Some(ref message) = index.message {
                    println!("  {}", message);
                }
            }
        }
    }
    Ok(())
}
