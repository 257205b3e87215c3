//! Typed engine configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for one file search engine instance.
///
/// Every field has a default so a minimal document (or an empty one) is
/// accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Name of the environment variable holding the provider API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for generation
    #[serde(default = "default_model")]
    pub model: String,

    /// Provider REST endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Token prices used for the cost estimate
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Generation parameters sent with every query
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Rate limit pacing for ingestion
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Where the collection pointer is persisted
    #[serde(default = "default_pointer_path")]
    pub pointer_path: PathBuf,

    /// Glob for source documents, relative to the source directory
    #[serde(default = "default_source_pattern")]
    pub source_pattern: String,

    /// MIME type declared for uploaded documents
    #[serde(default = "default_mime_type")]
    pub mime_type: String,

    /// Prefix of the remote store display name
    #[serde(default = "default_store_display_prefix")]
    pub store_display_prefix: String,

    /// Engine name reported in responses
    #[serde(default = "default_engine_name")]
    pub engine_name: String,

    /// The provider reports no confidence, so a fixed value is used
    #[serde(default = "default_confidence")]
    pub default_confidence: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            pricing: PricingConfig::default(),
            generation: GenerationConfig::default(),
            pacing: PacingConfig::default(),
            pointer_path: default_pointer_path(),
            source_pattern: default_source_pattern(),
            mime_type: default_mime_type(),
            store_display_prefix: default_store_display_prefix(),
            engine_name: default_engine_name(),
            default_confidence: default_confidence(),
        }
    }
}

/// Prices in USD per million tokens
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_input_price")]
    pub input_price: f64,

    #[serde(default = "default_output_price")]
    pub output_price: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            input_price: default_input_price(),
            output_price: default_output_price(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default)]
    pub system_instruction: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            system_instruction: String::new(),
        }
    }
}

/// Sleeps inserted between ingestion calls to stay under provider rate limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Sleep after every N upload attempts (0 disables)
    #[serde(default = "default_batch")]
    pub upload_every: usize,

    #[serde(default = "default_upload_delay_ms")]
    pub upload_delay_ms: u64,

    /// Sleep after every N import attempts (0 disables)
    #[serde(default = "default_batch")]
    pub import_every: usize,

    #[serde(default = "default_import_delay_ms")]
    pub import_delay_ms: u64,

    /// Log progress every N items (0 disables)
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

impl PacingConfig {
    /// No sleeps at all
    pub fn disabled() -> Self {
        Self {
            upload_every: 0,
            upload_delay_ms: 0,
            import_every: 0,
            import_delay_ms: 0,
            progress_every: default_progress_every(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            upload_every: default_batch(),
            upload_delay_ms: default_upload_delay_ms(),
            import_every: default_batch(),
            import_delay_ms: default_import_delay_ms(),
            progress_every: default_progress_every(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash-001".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_pointer_path() -> PathBuf {
    PathBuf::from("data/gemini_corpus/store_info.json")
}

fn default_source_pattern() -> String {
    "*.txt".to_string()
}

fn default_mime_type() -> String {
    "text/plain".to_string()
}

fn default_store_display_prefix() -> String {
    "fsc-penalty-cases".to_string()
}

fn default_engine_name() -> String {
    "Gemini File Search".to_string()
}

fn default_confidence() -> f64 {
    0.85
}

fn default_input_price() -> f64 {
    0.075
}

fn default_output_price() -> f64 {
    0.30
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_output_tokens() -> u32 {
    2000
}

fn default_batch() -> usize {
    10
}

fn default_upload_delay_ms() -> u64 {
    1000
}

fn default_import_delay_ms() -> u64 {
    500
}

fn default_progress_every() -> usize {
    50
}
