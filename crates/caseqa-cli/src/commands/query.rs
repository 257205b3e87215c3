//! Query command

use super::open_engine;
use crate::app::{OutputFormat, QueryArgs};
use crate::output::format_response;
use anyhow::Result;
use caseqa_core::{CaseQaError, ConfigLoader, QueryOptions, RagEngine};

pub async fn run(
    args: QueryArgs,
    loader: &ConfigLoader,
    config_name: &str,
    format: OutputFormat,
) -> Result<()> {
    let question = args.question.join(" ");
    let mut engine = open_engine(loader, config_name)?;

    if !engine.load_collection_pointer() {
        return Err(CaseQaError::Uninitialized(
            "file search index has not been built; run `caseqa build <dir>` first".to_string(),
        )
        .into());
    }

    let options = QueryOptions {
        temperature: args.temperature,
        max_output_tokens: args.max_output_tokens,
        system_instruction: args.system,
    };

    let response = engine.query(&question, &options).await?;
    print!("{}", format_response(&response, format));
    Ok(())
}
