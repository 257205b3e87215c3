//! Configuration management
//!
//! Configuration lives in named YAML documents inside one directory. A
//! [`ConfigLoader`] is built once at startup and handed to whoever needs it;
//! documents are read from disk on first request and served from memory
//! afterwards.

mod engine;

pub use engine::{EngineConfig, GenerationConfig, PacingConfig, PricingConfig};

use crate::error::{CaseQaError, Result};
use serde::Deserialize;
use serde_yaml::Mapping;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Default configuration directory, relative to the working directory
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Application-wide settings document
pub const APP_CONFIG_FILE: &str = "config.yaml";

/// Engine settings document
pub const ENGINE_CONFIG_FILE: &str = "gemini_config.yaml";

/// `app` section of the application settings document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub title: Option<String>,

    /// Case documents used when `build` is given no directory
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
}

/// Loads and caches named YAML documents from a directory
pub struct ConfigLoader {
    config_dir: PathBuf,
    configs: RwLock<HashMap<String, Mapping>>,
}

impl ConfigLoader {
    /// Create a loader rooted at `config_dir`
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            configs: RwLock::new(HashMap::new()),
        }
    }

    /// Create a loader from `CASEQA_CONFIG_DIR`, falling back to `config`
    pub fn from_env() -> Self {
        let dir = std::env::var("CASEQA_CONFIG_DIR")
            .unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
        Self::new(dir)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Read a document from disk and cache it under its file name
    pub fn load_config(&self, name: &str) -> Result<Mapping> {
        let path = self.config_dir.join(name);
        if !path.is_file() {
            return Err(CaseQaError::ConfigNotFound(path));
        }

        let content = std::fs::read_to_string(&path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&content)?;
        let mapping = match value {
            serde_yaml::Value::Mapping(m) => m,
            serde_yaml::Value::Null => Mapping::new(),
            _ => {
                return Err(CaseQaError::Config(format!(
                    "{} is not a mapping",
                    path.display()
                )))
            }
        };

        tracing::debug!("Loaded configuration {}", path.display());

        self.write_cache()
            .insert(name.to_string(), mapping.clone());

        Ok(mapping)
    }

    /// Return a cached document, loading it on first use
    pub fn get_config(&self, name: &str) -> Result<Mapping> {
        if let Some(cached) = self.cached(name) {
            return Ok(cached);
        }
        self.load_config(name)
    }

    /// Load every known document, skipping the ones that are absent
    pub fn load_all_configs(&self) -> HashMap<String, Mapping> {
        for name in [APP_CONFIG_FILE, ENGINE_CONFIG_FILE] {
            if let Err(e) = self.get_config(name) {
                tracing::warn!("{}", e);
            }
        }

        self.read_cache().clone()
    }

    /// Typed engine settings from the named document
    pub fn engine_config(&self, name: &str) -> Result<EngineConfig> {
        let mapping = self.get_config(name)?;
        let config = serde_yaml::from_value(serde_yaml::Value::Mapping(mapping))?;
        Ok(config)
    }

    /// Application settings; an absent document or section yields defaults
    pub fn app_config(&self) -> Result<AppConfig> {
        let all = self.load_all_configs();
        match all.get(APP_CONFIG_FILE).and_then(|doc| doc.get("app")) {
            Some(section) => Ok(serde_yaml::from_value(section.clone())?),
            None => Ok(AppConfig::default()),
        }
    }

    /// Read a credential from the environment
    pub fn get_api_key(&self, env_var: &str) -> Result<String> {
        require_env(env_var)
    }

    fn cached(&self, name: &str) -> Option<Mapping> {
        self.read_cache().get(name).cloned()
    }

    // A writer that panicked mid-insert leaves the map usable; recover it and
    // clear the flag so the warning is logged once.
    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<String, Mapping>> {
        self.configs.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Configuration cache lock was poisoned; recovering");
            self.configs.clear_poison();
            poisoned.into_inner()
        })
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<String, Mapping>> {
        self.configs.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Configuration cache lock was poisoned; recovering");
            self.configs.clear_poison();
            poisoned.into_inner()
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_DIR)
    }
}

/// Read a required environment variable; unset or empty is an error
pub fn require_env(env_var: &str) -> Result<String> {
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CaseQaError::MissingCredential(env_var.to_string())),
    }
}
