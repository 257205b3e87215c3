//! Error types for caseqa

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using CaseQaError
pub type Result<T> = std::result::Result<T, CaseQaError>;

/// Error type alias for convenience
pub type Error = CaseQaError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_INITIALIZED: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for caseqa
#[derive(Debug, Error)]
pub enum CaseQaError {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine not initialized: {0}")]
    Uninitialized(String),

    #[error("Provider error (HTTP {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CaseQaError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Uninitialized(_) => exit_codes::NOT_INITIALIZED,
            Self::ConfigNotFound(_)
            | Self::MissingCredential(_)
            | Self::Config(_)
            | Self::Yaml(_)
            | Self::InvalidInput(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
