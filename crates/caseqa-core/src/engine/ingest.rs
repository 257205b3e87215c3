//! Upload-then-import ingestion
//!
//! Files are processed one at a time in name order. The upload pass finishes
//! before the import pass starts. A failing file is recorded and skipped;
//! only an unreadable source directory or store creation can abort a run.
//! The directory is scanned before the store is created.

use crate::config::{EngineConfig, PacingConfig};
use crate::error::Result;
use crate::provider::SearchProvider;
use crate::store::FileRecord;
use glob::{MatchOptions, Pattern};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::{DirEntry, WalkDir};

/// Ingestion pass reported to progress callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestPhase {
    Upload,
    Import,
}

impl std::fmt::Display for IngestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload => write!(f, "Uploading"),
            Self::Import => write!(f, "Importing"),
        }
    }
}

/// Progress callback: `(phase, done, total)`
pub type ProgressCallback<'a> = &'a (dyn Fn(IngestPhase, usize, usize) + Send + Sync);

/// Final state of one source file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Uploaded, import pending
    Uploaded { file_name: String },
    Imported { file_name: String },
    UploadFailed { reason: String },
    ImportFailed { file_name: String, reason: String },
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uploaded { file_name } => write!(f, "uploaded as {}", file_name),
            Self::Imported { file_name } => write!(f, "imported as {}", file_name),
            Self::UploadFailed { reason } => write!(f, "upload failed: {}", reason),
            Self::ImportFailed { reason, .. } => write!(f, "import failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub display_name: String,
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn is_imported(&self) -> bool {
        matches!(self.status, FileStatus::Imported { .. })
    }

    pub fn is_uploaded(&self) -> bool {
        !matches!(self.status, FileStatus::UploadFailed { .. })
    }
}

/// Result of one ingestion run
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub store_resource_name: String,
    /// Source files matched in the directory
    pub found: usize,
    pub outcomes: Vec<FileOutcome>,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl IngestReport {
    pub fn uploaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_uploaded()).count()
    }

    pub fn imported(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_imported()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_imported())
    }

    /// Records for every file that is searchable in the store
    pub fn records(&self) -> Vec<FileRecord> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                FileStatus::Imported { file_name } => Some(FileRecord {
                    display_name: o.display_name.clone(),
                    file_name: file_name.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}

/// Source documents under `root` matching `pattern`, sorted by relative path.
///
/// `*` does not cross directories, so `*.txt` matches top-level files only
/// and `**/*.txt` recurses. A pattern without `/` never descends.
///
/// Only an unreadable `root` is an error. Broken links and unreadable
/// entries below it are logged and skipped.
pub fn scan_sources(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let max_depth = if pattern.contains('/') { usize::MAX } else { 1 };
    let pattern = Pattern::new(pattern)?;
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut results = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| path.to_string_lossy().to_string());

        if pattern.matches_with(&relative, options) {
            results.push(path.to_path_buf());
        }
    }

    Ok(results)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn display_name_for(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Sleep after every `every`-th operation
async fn pace(done: usize, every: usize, delay_ms: u64) {
    if every > 0 && delay_ms > 0 && done % every == 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

fn log_progress(phase: IngestPhase, done: usize, total: usize, pacing: &PacingConfig) {
    if pacing.progress_every > 0 && done % pacing.progress_every == 0 {
        tracing::info!("{} progress: {}/{}", phase, done, total);
    }
}

/// Create a store and populate it from `source_dir`
pub async fn ingest_directory(
    provider: &dyn SearchProvider,
    config: &EngineConfig,
    source_dir: &Path,
    progress: Option<ProgressCallback<'_>>,
) -> Result<IngestReport> {
    let start = Instant::now();
    let pacing = &config.pacing;

    let sources = scan_sources(source_dir, &config.source_pattern)?;
    let found = sources.len();
    tracing::info!("Found {} files in {}", found, source_dir.display());

    let display_name = format!(
        "{}-{}",
        config.store_display_prefix,
        chrono::Utc::now().timestamp()
    );
    tracing::info!("Creating file search store: {}", display_name);
    let store = provider.create_store(&display_name).await?;
    tracing::info!("File search store created: {}", store.name);

    // Upload pass
    let mut outcomes = Vec::with_capacity(found);
    for (i, path) in sources.into_iter().enumerate() {
        let done = i + 1;
        let display_name = display_name_for(&path);

        let status = match provider
            .upload_file(&path, &display_name, &config.mime_type)
            .await
        {
            Ok(file) => FileStatus::Uploaded {
                file_name: file.name,
            },
            Err(e) => {
                tracing::error!("Upload failed for {}: {}", display_name, e);
                FileStatus::UploadFailed {
                    reason: e.to_string(),
                }
            }
        };
        outcomes.push(FileOutcome {
            display_name,
            path,
            status,
        });

        log_progress(IngestPhase::Upload, done, found, pacing);
        if let Some(cb) = progress {
            cb(IngestPhase::Upload, done, found);
        }
        pace(done, pacing.upload_every, pacing.upload_delay_ms).await;
    }

    let uploaded: Vec<usize> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| o.is_uploaded())
        .map(|(idx, _)| idx)
        .collect();
    tracing::info!("Uploaded {}/{} files", uploaded.len(), found);

    // Import pass
    let total = uploaded.len();
    for (i, idx) in uploaded.into_iter().enumerate() {
        let done = i + 1;
        let outcome = &mut outcomes[idx];
        let FileStatus::Uploaded { file_name } = outcome.status.clone() else {
            continue;
        };

        outcome.status = match provider.import_file(&store.name, &file_name).await {
            Ok(_) => FileStatus::Imported { file_name },
            Err(e) => {
                tracing::error!("Import failed for {}: {}", outcome.display_name, e);
                FileStatus::ImportFailed {
                    file_name,
                    reason: e.to_string(),
                }
            }
        };

        log_progress(IngestPhase::Import, done, total, pacing);
        if let Some(cb) = progress {
            cb(IngestPhase::Import, done, total);
        }
        pace(done, pacing.import_every, pacing.import_delay_ms).await;
    }

    let report = IngestReport {
        store_resource_name: store.name,
        found,
        outcomes,
        elapsed: start.elapsed(),
    };

    tracing::info!(
        "Ingestion finished: uploaded {}/{}, imported {} in {:.1}s",
        report.uploaded(),
        found,
        report.imported(),
        report.elapsed.as_secs_f64()
    );

    Ok(report)
}
