//! Persisted collection pointer
//!
//! After ingestion the name of the remote store and the files it holds are
//! written to a small JSON document. Every later engine start reads it back
//! instead of talking to the provider.

use crate::error::Result;
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One ingested document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Local file name shown to users
    pub display_name: String,
    /// Opaque provider identifier (`files/...`)
    pub file_name: String,
}

/// Identifies the remote store an engine queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionPointer {
    #[serde(default)]
    pub store_resource_name: String,

    /// Epoch seconds
    #[serde(default)]
    pub created_at: f64,

    #[serde(default)]
    pub created_time: String,

    #[serde(default)]
    pub files: Vec<FileRecord>,

    #[serde(default)]
    pub total_files: usize,
}

impl CollectionPointer {
    /// Pointer stamped with the current time
    pub fn new(store_resource_name: impl Into<String>, files: Vec<FileRecord>) -> Self {
        let now = Utc::now();
        Self {
            store_resource_name: store_resource_name.into(),
            created_at: now.timestamp_millis() as f64 / 1000.0,
            created_time: now
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            total_files: files.len(),
            files,
        }
    }

    /// Hours elapsed since creation
    pub fn age_hours(&self) -> f64 {
        let now = Utc::now().timestamp_millis() as f64 / 1000.0;
        (now - self.created_at) / 3600.0
    }
}

/// Display summary of the persisted pointer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexInfo {
    pub exists: bool,
    /// Stores never expire; kept for display compatibility
    pub expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_files: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_resource_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IndexInfo {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            exists: false,
            expired: false,
            created_time: None,
            age_hours: None,
            total_files: None,
            store_resource_name: None,
            message: Some(message.into()),
        }
    }

    fn from_pointer(pointer: &CollectionPointer) -> Self {
        Self {
            exists: true,
            expired: false,
            created_time: Some(pointer.created_time.clone()),
            age_hours: Some(pointer.age_hours()),
            total_files: Some(pointer.total_files),
            store_resource_name: Some(pointer.store_resource_name.clone()),
            message: None,
        }
    }
}

/// Reads and writes the pointer document
#[derive(Debug, Clone)]
pub struct PointerStore {
    path: PathBuf,
}

impl PointerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the pointer, replacing any previous one in a single rename
    pub fn save(&self, pointer: &CollectionPointer) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(pointer)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            if let Err(cleanup) = std::fs::remove_file(&tmp) {
                tracing::warn!("Failed to remove {}: {}", tmp.display(), cleanup);
            }
            return Err(e.into());
        }

        tracing::info!(
            "Saved store pointer to {} (store: {}, {} files)",
            self.path.display(),
            pointer.store_resource_name,
            pointer.total_files
        );
        Ok(())
    }

    /// `Ok(None)` when no pointer has been written yet
    pub fn load(&self) -> Result<Option<CollectionPointer>> {
        if !self.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let pointer = serde_json::from_str(&content)?;
        Ok(Some(pointer))
    }

    /// Summary for display; read failures are reported as "not found"
    pub fn index_info(&self) -> IndexInfo {
        match self.load() {
            Ok(Some(pointer)) => IndexInfo::from_pointer(&pointer),
            Ok(None) => IndexInfo::not_found("Index does not exist"),
            Err(e) => {
                tracing::error!("Failed to read index info: {}", e);
                IndexInfo::not_found(format!("Failed to read index info: {}", e))
            }
        }
    }
}
