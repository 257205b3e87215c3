//! JSON output formatter

use caseqa_core::RagResponse;

pub fn format_response(response: &RagResponse) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string()) + "\n"
}
