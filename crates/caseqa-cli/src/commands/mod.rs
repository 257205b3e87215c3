//! CLI command handlers

pub mod build;
pub mod info;
pub mod query;
pub mod status;

use anyhow::Result;
use caseqa_core::{ConfigLoader, FileSearchEngine};

/// Build the engine from the named config document.
///
/// Missing configuration or credentials are fatal here, before any command
/// runs.
pub fn open_engine(loader: &ConfigLoader, config_name: &str) -> Result<FileSearchEngine> {
    let config = loader.engine_config(config_name)?;
    let engine = FileSearchEngine::from_config(config)?;
    Ok(engine)
}
