//! Question-answering engines
//!
//! An engine turns a directory of case documents into a searchable index and
//! answers questions against it. [`FileSearchEngine`] delegates both to a
//! hosted [`SearchProvider`](crate::provider::SearchProvider).

mod citations;
mod cost;
mod file_search;
mod ingest;

pub use citations::{extract_sources, SNIPPET_MAX_CHARS, UNKNOWN_FILENAME};
pub use cost::{approximate_tokens, estimate_cost, TOKENS_PER_CHAR};
pub use file_search::FileSearchEngine;
pub use ingest::{
    ingest_directory, scan_sources, FileOutcome, FileStatus, IngestPhase, IngestReport,
    ProgressCallback,
};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Engine contract shared by front ends
#[async_trait]
pub trait RagEngine: Send + Sync {
    /// Build a fresh index from the documents in `source_dir`
    async fn build_index(&mut self, source_dir: &Path) -> Result<IngestReport>;

    /// Answer a question against the current index
    async fn query(&self, question: &str, options: &QueryOptions) -> Result<RagResponse>;

    /// Current engine state
    fn status(&self) -> EngineStatus;

    /// Get engine name
    fn name(&self) -> &str;
}

/// One piece of evidence attached to an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub filename: String,
    pub snippet: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Answer to one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    pub answer: String,
    pub sources: Vec<Source>,
    pub confidence: f64,
    /// Seconds
    pub latency: f64,
    /// Approximate USD, see [`estimate_cost`]
    pub cost_estimate: f64,
    pub engine_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Per-query overrides of the configured generation parameters
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub system_instruction: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub engine_name: String,
    pub initialized: bool,
    pub model: String,
    pub store_resource_name: Option<String>,
}
