//! Hosted file search provider
//!
//! The provider owns storage, retrieval and generation. This crate only
//! talks to it through [`SearchProvider`]:
//! - create a store
//! - upload a file and import it into a store
//! - generate an answer grounded on a store

mod gemini;
pub mod schema;

pub use gemini::GeminiClient;
pub use schema::GenerateContentResponse;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Provider operations used by the engine
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Create an empty store
    async fn create_store(&self, display_name: &str) -> Result<RemoteStore>;

    /// Upload a local file to the provider's file area
    async fn upload_file(
        &self,
        path: &Path,
        display_name: &str,
        mime_type: &str,
    ) -> Result<RemoteFile>;

    /// Import an uploaded file into a store
    async fn import_file(&self, store_name: &str, file_name: &str) -> Result<ImportOperation>;

    /// Generate an answer using the store as a retrieval tool
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateContentResponse>;

    /// Get provider name
    fn provider_name(&self) -> &str;
}

/// A store as returned by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStore {
    /// Resource name, e.g. `fileSearchStores/abc`
    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,
}

/// An uploaded file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc`
    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub mime_type: Option<String>,

    #[serde(default)]
    pub uri: Option<String>,
}

/// Long-running import operation; never polled
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOperation {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub done: bool,
}

/// Grounded generation request
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub question: String,
    pub store_names: Vec<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Omitted from the request when `None` or empty
    pub system_instruction: Option<String>,
}
