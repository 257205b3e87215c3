//! Output formatters

pub mod json;
pub mod markdown;
pub mod terminal;

use crate::app::OutputFormat;
use caseqa_core::RagResponse;

/// Format an answer with its citations
pub fn format_response(response: &RagResponse, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_response(response),
        OutputFormat::Md => markdown::format_response(response),
        OutputFormat::Cli => terminal::format_response(response),
    }
}
