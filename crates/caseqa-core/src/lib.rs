//! caseqa Core Library
//!
//! Question answering over regulatory penalty case documents.
//!
//! # Features
//! - Upload-then-import ingestion into a hosted file search store
//! - Grounded answers with citation snippets
//! - Latency and cost estimates per query
//! - Persisted store pointer so restarts never re-ingest

pub mod config;
pub mod engine;
pub mod error;
pub mod provider;
pub mod store;

pub use config::{require_env, AppConfig, ConfigLoader, EngineConfig, GenerationConfig, PacingConfig, PricingConfig};
pub use engine::{
    estimate_cost, extract_sources, EngineStatus, FileOutcome, FileSearchEngine, FileStatus,
    IngestPhase, IngestReport, QueryOptions, RagEngine, RagResponse, Source,
};
pub use error::{CaseQaError, Error, Result};
pub use provider::{
    GeminiClient, GenerateContentResponse, GenerateRequest, ImportOperation, RemoteFile,
    RemoteStore, SearchProvider,
};
pub use store::{CollectionPointer, FileRecord, IndexInfo, PointerStore};
