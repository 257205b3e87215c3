//! Engine backed by a hosted file search store

use super::{
    estimate_cost, extract_sources, ingest_directory, EngineStatus, IngestReport,
    ProgressCallback, QueryOptions, RagEngine, RagResponse,
};
use crate::config::EngineConfig;
use crate::error::{CaseQaError, Result};
use crate::provider::{GeminiClient, GenerateContentResponse, GenerateRequest, SearchProvider};
use crate::store::{CollectionPointer, IndexInfo, PointerStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// File search engine.
///
/// Starts uninitialized. [`load_collection_pointer`](Self::load_collection_pointer)
/// or a successful [`build_index`](RagEngine::build_index) initializes it, and
/// only then does [`query`](RagEngine::query) reach the provider.
pub struct FileSearchEngine {
    provider: Arc<dyn SearchProvider>,
    config: EngineConfig,
    pointers: PointerStore,
    pointer: Option<CollectionPointer>,
    initialized: bool,
}

impl FileSearchEngine {
    /// Create from a provider and configuration
    pub fn new(provider: Arc<dyn SearchProvider>, config: EngineConfig) -> Self {
        let pointers = PointerStore::new(&config.pointer_path);
        tracing::info!("File search engine created (model: {})", config.model);

        Self {
            provider,
            config,
            pointers,
            pointer: None,
            initialized: false,
        }
    }

    /// Create with a Gemini client; fails if the credential is not set
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let client = GeminiClient::from_config(&config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn store_resource_name(&self) -> Option<&str> {
        self.pointer
            .as_ref()
            .map(|p| p.store_resource_name.as_str())
    }

    /// Load the persisted pointer without contacting the provider.
    ///
    /// Returns `false` when the pointer is missing, unreadable, or names no
    /// store; the engine then stays uninitialized.
    pub fn load_collection_pointer(&mut self) -> bool {
        let pointer = match self.pointers.load() {
            Ok(Some(pointer)) => pointer,
            Ok(None) => {
                tracing::warn!(
                    "File search store pointer not found at {}",
                    self.pointers.path().display()
                );
                return false;
            }
            Err(e) => {
                tracing::error!("Failed to load file search store pointer: {}", e);
                return false;
            }
        };

        if pointer.store_resource_name.trim().is_empty() {
            tracing::error!("File search store pointer has no store resource name");
            return false;
        }

        tracing::info!(
            "Loaded file search store {}: {} files (created {})",
            pointer.store_resource_name,
            pointer.total_files,
            pointer.created_time
        );
        self.pointer = Some(pointer);
        self.initialized = true;
        true
    }

    /// Presence, age and size of the persisted index; never fails
    pub fn get_index_info(&self) -> IndexInfo {
        self.pointers.index_info()
    }

    /// [`build_index`](RagEngine::build_index) with a progress callback
    pub async fn build_index_with_progress(
        &mut self,
        source_dir: &Path,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<IngestReport> {
        tracing::info!("Building file search store from {}", source_dir.display());

        let report = ingest_directory(self.provider.as_ref(), &self.config, source_dir, progress)
            .await
            .map_err(|e| {
                tracing::error!("Index build failed: {}", e);
                e
            })?;

        let pointer = CollectionPointer::new(&report.store_resource_name, report.records());
        self.pointers.save(&pointer)?;

        self.pointer = Some(pointer);
        self.initialized = true;
        Ok(report)
    }

    fn active_store(&self) -> Result<&str> {
        if !self.initialized {
            return Err(CaseQaError::Uninitialized(
                "no index loaded; build the index or load the store pointer first".to_string(),
            ));
        }

        self.store_resource_name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                CaseQaError::Uninitialized(
                    "file search store missing; rebuild the index".to_string(),
                )
            })
    }

    fn build_request(&self, store: &str, question: &str, options: &QueryOptions) -> GenerateRequest {
        let generation = &self.config.generation;
        GenerateRequest {
            model: self.config.model.clone(),
            question: question.to_string(),
            store_names: vec![store.to_string()],
            temperature: options.temperature.unwrap_or(generation.temperature),
            max_output_tokens: options
                .max_output_tokens
                .unwrap_or(generation.max_output_tokens),
            system_instruction: options
                .system_instruction
                .clone()
                .or_else(|| Some(generation.system_instruction.clone()))
                .filter(|s| !s.trim().is_empty()),
        }
    }
}

fn response_metadata(
    response: &GenerateContentResponse,
    store: &str,
) -> HashMap<String, serde_json::Value> {
    let mut metadata = HashMap::new();
    metadata.insert("store".to_string(), serde_json::json!(store));

    if let Some(version) = &response.model_version {
        metadata.insert("model_version".to_string(), serde_json::json!(version));
    }
    if let Some(usage) = &response.usage_metadata {
        metadata.insert(
            "prompt_tokens".to_string(),
            serde_json::json!(usage.prompt_token_count),
        );
        metadata.insert(
            "output_tokens".to_string(),
            serde_json::json!(usage.candidates_token_count),
        );
    }
    if let Some(reason) = response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
    {
        metadata.insert("finish_reason".to_string(), serde_json::json!(reason));
    }

    metadata
}

#[async_trait]
impl RagEngine for FileSearchEngine {
    async fn build_index(&mut self, source_dir: &Path) -> Result<IngestReport> {
        self.build_index_with_progress(source_dir, None).await
    }

    async fn query(&self, question: &str, options: &QueryOptions) -> Result<RagResponse> {
        let store = self.active_store()?;

        if question.trim().is_empty() {
            return Err(CaseQaError::InvalidInput("question is empty".to_string()));
        }

        let start = Instant::now();
        let request = self.build_request(store, question, options);

        let response = self.provider.generate(&request).await.map_err(|e| {
            tracing::error!("Query failed: {}", e);
            e
        })?;

        let answer = response.text();
        if answer.is_empty() {
            tracing::warn!("Provider returned no answer text");
        }
        let sources = extract_sources(&response);

        let latency = start.elapsed().as_secs_f64();
        let cost_estimate = estimate_cost(question, &answer, &self.config.pricing);

        tracing::debug!(
            "Query answered in {:.2}s with {} sources",
            latency,
            sources.len()
        );

        Ok(RagResponse {
            answer,
            sources,
            confidence: self.config.default_confidence,
            latency,
            cost_estimate,
            engine_name: self.config.engine_name.clone(),
            metadata: Some(response_metadata(&response, store)),
        })
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            engine_name: self.config.engine_name.clone(),
            initialized: self.initialized,
            model: self.config.model.clone(),
            store_resource_name: self.store_resource_name().map(str::to_string),
        }
    }

    fn name(&self) -> &str {
        &self.config.engine_name
    }
}

impl std::fmt::Debug for FileSearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSearchEngine")
            .field("provider", &self.provider.provider_name())
            .field("initialized", &self.initialized)
            .field("store", &self.store_resource_name())
            .finish()
    }
}
