//! Gemini File Search client over the Generative Language REST API

use super::schema::{GenerateContentResponse, API_VERSION};
use super::{GenerateRequest, ImportOperation, RemoteFile, RemoteStore, SearchProvider};
use crate::config::{require_env, EngineConfig};
use crate::error::{CaseQaError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Client for Gemini file search stores and generation
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client for `base_url` with an explicit key
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
        })
    }

    /// Create from engine configuration; the key comes from `api_key_env`
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let api_key = require_env(&config.api_key_env)?;
        Self::new(&config.base_url, &api_key, config.timeout_secs)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_VERSION, path)
    }

    fn build_generate_body(request: &GenerateRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.question }]
            }],
            "tools": [{
                "fileSearch": {
                    "fileSearchStoreNames": request.store_names
                }
            }],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_output_tokens
            }
        });

        if let Some(system) = request
            .system_instruction
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system }]
            });
        }

        body
    }
}

/// Turn a non-2xx reply into a provider error
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    // Google wraps errors as {"error": {"message": ...}}
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);

    Err(CaseQaError::Provider {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SearchProvider for GeminiClient {
    async fn create_store(&self, display_name: &str) -> Result<RemoteStore> {
        let url = self.api_url("fileSearchStores");
        tracing::debug!("Creating file search store {}", display_name);

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&serde_json::json!({ "displayName": display_name }))
            .send()
            .await?;

        let store: RemoteStore = ensure_success(response).await?.json().await?;
        Ok(store)
    }

    async fn upload_file(
        &self,
        path: &Path,
        display_name: &str,
        mime_type: &str,
    ) -> Result<RemoteFile> {
        #[derive(Deserialize)]
        struct UploadResponse {
            file: RemoteFile,
        }

        let bytes = tokio::fs::read(path).await?;

        // Resumable protocol: open a session, then send the bytes and finalize
        let start_url = format!("{}/upload/{}/files", self.base_url, API_VERSION);
        let response = self
            .http_client
            .post(&start_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&serde_json::json!({ "file": { "displayName": display_name } }))
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let upload_url = response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| CaseQaError::Provider {
                status: response.status().as_u16(),
                message: format!("upload session for {} returned no upload URL", display_name),
            })?;

        let response = self
            .http_client
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;

        let uploaded: UploadResponse = ensure_success(response).await?.json().await?;
        Ok(uploaded.file)
    }

    async fn import_file(&self, store_name: &str, file_name: &str) -> Result<ImportOperation> {
        let url = self.api_url(&format!("{}:importFile", store_name));

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&serde_json::json!({ "fileName": file_name }))
            .send()
            .await?;

        let operation: ImportOperation = ensure_success(response).await?.json().await?;
        Ok(operation)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateContentResponse> {
        let url = self.api_url(&format!("models/{}:generateContent", request.model));
        let body = Self::build_generate_body(request);

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let reply: GenerateContentResponse = ensure_success(response).await?.json().await?;
        Ok(reply)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }
}
