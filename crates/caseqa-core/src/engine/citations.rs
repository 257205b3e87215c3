//! Citation extraction from grounded replies

use super::Source;
use crate::provider::schema::{GenerateContentResponse, RetrievedContext};
use std::collections::HashMap;

/// Maximum snippet length in characters
pub const SNIPPET_MAX_CHARS: usize = 500;

/// Score used when the provider does not score a chunk
pub const DEFAULT_SCORE: f64 = 1.0;

/// Filename used when a chunk carries neither title nor URI
pub const UNKNOWN_FILENAME: &str = "unknown document";

/// Provenance tag attached to every citation
pub const SOURCE_TYPE: &str = "file_search";

/// Build citations from the first candidate's grounding chunks.
///
/// Chunks without a retrieved context (e.g. web results) are skipped, but the
/// `index` metadata keeps the chunk's position in the reply so citations can
/// be matched against grounding supports.
pub fn extract_sources(response: &GenerateContentResponse) -> Vec<Source> {
    let sources: Vec<Source> = response
        .grounding()
        .map(|grounding| {
            grounding
                .grounding_chunks
                .iter()
                .enumerate()
                .filter_map(|(index, chunk)| {
                    let context = chunk.retrieved_context.as_ref()?;
                    Some(Source {
                        filename: filename_for(context),
                        snippet: snippet_for(context),
                        score: chunk.score.unwrap_or(DEFAULT_SCORE),
                        metadata: Some(source_metadata(index)),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    if sources.is_empty() {
        tracing::warn!("No sources found in grounding metadata");
    }

    sources
}

fn filename_for(context: &RetrievedContext) -> String {
    if let Some(title) = context.title.as_deref().filter(|t| !t.is_empty()) {
        return title.to_string();
    }

    context
        .uri
        .as_deref()
        .and_then(|uri| uri.rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_FILENAME.to_string())
}

fn snippet_for(context: &RetrievedContext) -> String {
    context
        .text
        .as_deref()
        .map(|text| text.chars().take(SNIPPET_MAX_CHARS).collect())
        .unwrap_or_default()
}

fn source_metadata(index: usize) -> HashMap<String, serde_json::Value> {
    let mut metadata = HashMap::new();
    metadata.insert("type".to_string(), serde_json::json!(SOURCE_TYPE));
    metadata.insert("index".to_string(), serde_json::json!(index));
    metadata
}
