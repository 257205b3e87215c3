//! Integration tests for the file search engine
//!
//! A scripted provider stands in for the hosted service so ingestion and
//! query orchestration can be checked without network access.

use async_trait::async_trait;
use caseqa_core::{
    CaseQaError, EngineConfig, FileSearchEngine, GenerateContentResponse, GenerateRequest,
    ImportOperation, IngestPhase, PacingConfig, QueryOptions, RagEngine, RemoteFile, RemoteStore,
    Result, SearchProvider,
};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Provider that records every call and fails on request
#[derive(Default)]
struct FakeProvider {
    calls: Mutex<Vec<String>>,
    fail_uploads: Vec<String>,
    fail_imports: Vec<String>,
    fail_generate: bool,
    reply: serde_json::Value,
    last_request: Mutex<Option<GenerateRequest>>,
}

impl FakeProvider {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SearchProvider for FakeProvider {
    async fn create_store(&self, display_name: &str) -> Result<RemoteStore> {
        self.record(format!("create:{}", display_name));
        Ok(RemoteStore {
            name: "fileSearchStores/fake-store".to_string(),
            display_name: Some(display_name.to_string()),
        })
    }

    async fn upload_file(
        &self,
        _path: &Path,
        display_name: &str,
        _mime_type: &str,
    ) -> Result<RemoteFile> {
        self.record(format!("upload:{}", display_name));
        if self.fail_uploads.iter().any(|f| f == display_name) {
            return Err(CaseQaError::Provider {
                status: 429,
                message: "Resource exhausted".to_string(),
            });
        }
        Ok(RemoteFile {
            name: format!("files/{}", display_name),
            display_name: Some(display_name.to_string()),
            mime_type: Some("text/plain".to_string()),
            uri: None,
        })
    }

    async fn import_file(&self, store_name: &str, file_name: &str) -> Result<ImportOperation> {
        self.record(format!("import:{}", file_name));
        assert_eq!(store_name, "fileSearchStores/fake-store");
        if self.fail_imports.iter().any(|f| f == file_name) {
            return Err(CaseQaError::Provider {
                status: 500,
                message: "Internal error".to_string(),
            });
        }
        Ok(ImportOperation {
            name: format!("operations/{}", file_name),
            done: false,
        })
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateContentResponse> {
        self.record("generate".to_string());
        *self.last_request.lock().unwrap() = Some(request.clone());
        if self.fail_generate {
            return Err(CaseQaError::Provider {
                status: 503,
                message: "The model is overloaded".to_string(),
            });
        }
        if self.reply.is_null() {
            return Ok(GenerateContentResponse::default());
        }
        Ok(serde_json::from_value(self.reply.clone()).unwrap())
    }

    fn provider_name(&self) -> &str {
        "fake"
    }
}

/// Provider that must never be reached
struct UnreachableProvider;

#[async_trait]
impl SearchProvider for UnreachableProvider {
    async fn create_store(&self, _display_name: &str) -> Result<RemoteStore> {
        panic!("provider must not be called");
    }

    async fn upload_file(&self, _: &Path, _: &str, _: &str) -> Result<RemoteFile> {
        panic!("provider must not be called");
    }

    async fn import_file(&self, _: &str, _: &str) -> Result<ImportOperation> {
        panic!("provider must not be called");
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<GenerateContentResponse> {
        panic!("provider must not be called");
    }

    fn provider_name(&self) -> &str {
        "unreachable"
    }
}

fn test_config(dir: &TempDir) -> EngineConfig {
    EngineConfig {
        pointer_path: dir.path().join("gemini_corpus/store_info.json"),
        pacing: PacingConfig::disabled(),
        ..EngineConfig::default()
    }
}

fn write_cases(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        fs::write(dir.join(name), format!("Penalty decision {}", name)).unwrap();
    }
}

fn grounded_reply() -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": "The bank was fined NT$6 million." }] },
            "finishReason": "STOP",
            "groundingMetadata": {
                "groundingChunks": [
                    { "retrievedContext": { "title": "A.txt", "text": "hello" } },
                    { "retrievedContext": { "uri": "fileSearchStores/s/documents/B.txt", "text": "world" }, "score": 0.5 }
                ]
            }
        }],
        "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 8 }
    })
}

#[tokio::test]
async fn test_build_with_no_matching_files() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    write_cases(&data, &["notes.md", "index.html"]);

    let provider = Arc::new(FakeProvider::default());
    let mut engine = FileSearchEngine::new(provider.clone(), test_config(&temp));

    let report = engine.build_index(&data).await.unwrap();
    assert_eq!(report.found, 0);
    assert_eq!(report.imported(), 0);

    let info = engine.get_index_info();
    assert!(info.exists);
    assert_eq!(info.total_files, Some(0));
    assert!(engine.is_initialized());
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn test_build_records_only_fully_ingested_files() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    write_cases(&data, &["a.txt", "b.txt", "c.txt", "d.txt", "skip.md"]);

    let provider = Arc::new(FakeProvider {
        fail_uploads: vec!["b.txt".to_string()],
        fail_imports: vec!["files/c.txt".to_string()],
        ..FakeProvider::default()
    });
    let mut engine = FileSearchEngine::new(provider.clone(), test_config(&temp));

    let report = engine.build_index(&data).await.unwrap();
    assert_eq!(report.found, 4);
    assert_eq!(report.uploaded(), 3);
    assert_eq!(report.imported(), 2);
    assert_eq!(report.failures().count(), 2);

    let pointer = caseqa_core::PointerStore::new(&engine.config().pointer_path)
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(pointer.store_resource_name, "fileSearchStores/fake-store");
    assert_eq!(pointer.total_files, 2);
    assert!(pointer.total_files <= report.found);
    let names: Vec<&str> = pointer.files.iter().map(|f| f.display_name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "d.txt"]);
    assert_eq!(pointer.files[0].file_name, "files/a.txt");
}

#[tokio::test]
async fn test_upload_pass_completes_before_import_pass() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    write_cases(&data, &["a.txt", "b.txt"]);

    let provider = Arc::new(FakeProvider::default());
    let mut engine = FileSearchEngine::new(provider.clone(), test_config(&temp));
    engine.build_index(&data).await.unwrap();

    let calls = provider.calls();
    assert!(calls[0].starts_with("create:fsc-penalty-cases-"));
    assert_eq!(
        &calls[1..],
        &[
            "upload:a.txt",
            "upload:b.txt",
            "import:files/a.txt",
            "import:files/b.txt"
        ]
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_build_skips_broken_entries_in_source_dir() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    write_cases(&data, &["a.txt", "b.txt"]);
    std::os::unix::fs::symlink("/nonexistent/caseqa/target", data.join("stale-link")).unwrap();
    std::os::unix::fs::symlink("/nonexistent/caseqa/c.txt", data.join("c.txt")).unwrap();

    let provider = Arc::new(FakeProvider::default());
    let mut engine = FileSearchEngine::new(provider.clone(), test_config(&temp));

    let report = engine.build_index(&data).await.unwrap();
    assert_eq!(report.found, 2);
    assert_eq!(report.imported(), 2);
    assert_eq!(provider.calls().len(), 5);

    let info = engine.get_index_info();
    assert!(info.exists);
    assert_eq!(info.total_files, Some(2));
}

#[tokio::test]
async fn test_build_missing_source_dir_creates_no_store() {
    let temp = TempDir::new().unwrap();
    let provider = Arc::new(FakeProvider::default());
    let mut engine = FileSearchEngine::new(provider.clone(), test_config(&temp));

    let err = engine
        .build_index(&temp.path().join("vanished"))
        .await
        .unwrap_err();
    assert!(matches!(err, CaseQaError::WalkDir(_)));
    assert!(provider.calls().iter().all(|c| !c.starts_with("create:")));
    assert!(provider.calls().is_empty());
    assert!(!engine.is_initialized());
    assert!(!engine.get_index_info().exists);
}

#[tokio::test]
async fn test_build_reports_progress() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    write_cases(&data, &["a.txt", "b.txt", "c.txt"]);

    let provider = Arc::new(FakeProvider {
        fail_uploads: vec!["a.txt".to_string()],
        ..FakeProvider::default()
    });
    let mut engine = FileSearchEngine::new(provider, test_config(&temp));

    let seen = Mutex::new(Vec::new());
    let callback = |phase: IngestPhase, done: usize, total: usize| {
        seen.lock().unwrap().push((phase, done, total));
    };
    engine
        .build_index_with_progress(&data, Some(&callback))
        .await
        .unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(
        seen,
        vec![
            (IngestPhase::Upload, 1, 3),
            (IngestPhase::Upload, 2, 3),
            (IngestPhase::Upload, 3, 3),
            (IngestPhase::Import, 1, 2),
            (IngestPhase::Import, 2, 2),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_build_paces_provider_calls() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let names: Vec<String> = (1..=25).map(|i| format!("case-{:03}.txt", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    write_cases(&data, &refs);

    let config = EngineConfig {
        pointer_path: temp.path().join("store_info.json"),
        ..EngineConfig::default()
    };
    let mut engine = FileSearchEngine::new(Arc::new(FakeProvider::default()), config);

    let start = tokio::time::Instant::now();
    let report = engine.build_index(&data).await.unwrap();

    // 25 uploads sleep twice for 1s, 25 imports sleep twice for 0.5s
    assert_eq!(report.imported(), 25);
    assert!(start.elapsed() >= std::time::Duration::from_secs(3));
}

#[tokio::test]
async fn test_query_before_initialization_never_calls_provider() {
    let temp = TempDir::new().unwrap();
    let engine = FileSearchEngine::new(Arc::new(UnreachableProvider), test_config(&temp));

    let err = engine
        .query("Which banks were fined?", &QueryOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CaseQaError::Uninitialized(_)));
    assert!(!engine.status().initialized);
}

#[tokio::test]
async fn test_load_pointer_missing_keeps_engine_uninitialized() {
    let temp = TempDir::new().unwrap();
    let mut engine = FileSearchEngine::new(Arc::new(UnreachableProvider), test_config(&temp));

    assert!(!engine.load_collection_pointer());
    assert!(!engine.is_initialized());
    assert!(!engine.get_index_info().exists);

    let err = engine
        .query("question", &QueryOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CaseQaError::Uninitialized(_)));
}

#[tokio::test]
async fn test_load_pointer_rejects_corrupt_and_empty_documents() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    fs::create_dir_all(config.pointer_path.parent().unwrap()).unwrap();

    fs::write(&config.pointer_path, "not json").unwrap();
    let mut engine = FileSearchEngine::new(Arc::new(UnreachableProvider), config.clone());
    assert!(!engine.load_collection_pointer());

    fs::write(&config.pointer_path, r#"{"store_resource_name": "", "total_files": 3}"#).unwrap();
    assert!(!engine.load_collection_pointer());
    assert!(!engine.is_initialized());
}

#[tokio::test]
async fn test_build_then_load_round_trip() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    write_cases(&data, &["a.txt", "b.txt", "c.txt"]);

    let mut builder = FileSearchEngine::new(Arc::new(FakeProvider::default()), test_config(&temp));
    builder.build_index(&data).await.unwrap();

    let mut reader = FileSearchEngine::new(Arc::new(UnreachableProvider), test_config(&temp));
    assert!(reader.load_collection_pointer());
    assert!(reader.is_initialized());
    assert_eq!(
        reader.store_resource_name(),
        Some("fileSearchStores/fake-store")
    );

    let info = reader.get_index_info();
    assert_eq!(info.total_files, Some(3));
    assert_eq!(
        info.store_resource_name.as_deref(),
        Some("fileSearchStores/fake-store")
    );
}

fn loaded_engine(temp: &TempDir, provider: Arc<FakeProvider>) -> FileSearchEngine {
    let config = test_config(temp);
    caseqa_core::PointerStore::new(&config.pointer_path)
        .save(&caseqa_core::CollectionPointer::new(
            "fileSearchStores/fake-store",
            vec![],
        ))
        .unwrap();

    let mut engine = FileSearchEngine::new(provider, config);
    assert!(engine.load_collection_pointer());
    engine
}

#[tokio::test]
async fn test_query_extracts_answer_and_sources() {
    let temp = TempDir::new().unwrap();
    let provider = Arc::new(FakeProvider {
        reply: grounded_reply(),
        ..FakeProvider::default()
    });
    let engine = loaded_engine(&temp, provider.clone());

    let question = "Which banks were fined?";
    let response = engine.query(question, &QueryOptions::default()).await.unwrap();

    assert_eq!(response.answer, "The bank was fined NT$6 million.");
    assert_eq!(response.engine_name, "Gemini File Search");
    assert_eq!(response.confidence, 0.85);
    assert!(response.latency >= 0.0);

    let expected_cost =
        caseqa_core::estimate_cost(question, &response.answer, &engine.config().pricing);
    assert_eq!(response.cost_estimate, expected_cost);

    assert_eq!(response.sources.len(), 2);
    assert_eq!(response.sources[0].filename, "A.txt");
    assert_eq!(response.sources[0].snippet, "hello");
    assert_eq!(response.sources[0].score, 1.0);
    assert_eq!(response.sources[1].filename, "B.txt");
    assert_eq!(response.sources[1].score, 0.5);

    let metadata = response.metadata.unwrap();
    assert_eq!(metadata["store"], "fileSearchStores/fake-store");
    assert_eq!(metadata["finish_reason"], "STOP");

    let request = provider.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.store_names, vec!["fileSearchStores/fake-store"]);
    assert_eq!(request.temperature, 0.1);
    assert_eq!(request.max_output_tokens, 2000);
    assert_eq!(request.question, question);
}

#[tokio::test]
async fn test_query_without_grounding_returns_empty_sources() {
    let temp = TempDir::new().unwrap();
    let provider = Arc::new(FakeProvider {
        reply: serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "No matching cases." }] } }]
        }),
        ..FakeProvider::default()
    });
    let engine = loaded_engine(&temp, provider);

    let response = engine
        .query("Any fines for crypto exchanges?", &QueryOptions::default())
        .await
        .unwrap();
    assert_eq!(response.answer, "No matching cases.");
    assert!(response.sources.is_empty());
}

#[tokio::test]
async fn test_query_options_override_configuration() {
    let temp = TempDir::new().unwrap();
    let provider = Arc::new(FakeProvider {
        reply: grounded_reply(),
        ..FakeProvider::default()
    });
    let engine = loaded_engine(&temp, provider.clone());

    let options = QueryOptions {
        temperature: Some(0.7),
        max_output_tokens: Some(256),
        system_instruction: Some("Answer briefly.".to_string()),
    };
    engine.query("question", &options).await.unwrap();

    let request = provider.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.temperature, 0.7);
    assert_eq!(request.max_output_tokens, 256);
    assert_eq!(request.system_instruction.as_deref(), Some("Answer briefly."));
}

#[tokio::test]
async fn test_query_falls_back_to_configured_system_instruction() {
    let temp = TempDir::new().unwrap();
    let provider = Arc::new(FakeProvider::default());
    let engine = loaded_engine(&temp, provider.clone());

    engine.query("question", &QueryOptions::default()).await.unwrap();
    let request = provider.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.system_instruction, None);
    assert_eq!(request.temperature, 0.1);
    assert_eq!(request.max_output_tokens, 2000);

    let mut config = test_config(&temp);
    config.generation.system_instruction = "Cite case numbers.".to_string();
    let mut engine = FileSearchEngine::new(provider.clone(), config);
    assert!(engine.load_collection_pointer());

    engine.query("question", &QueryOptions::default()).await.unwrap();
    let request = provider.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.system_instruction.as_deref(), Some("Cite case numbers."));
}

#[tokio::test]
async fn test_query_propagates_provider_error() {
    let temp = TempDir::new().unwrap();
    let provider = Arc::new(FakeProvider {
        fail_generate: true,
        ..FakeProvider::default()
    });
    let engine = loaded_engine(&temp, provider.clone());

    let err = engine
        .query("question", &QueryOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CaseQaError::Provider { status: 503, .. }));

    // No retry
    assert_eq!(provider.calls(), vec!["generate"]);
}

#[tokio::test]
async fn test_query_rejects_blank_question() {
    let temp = TempDir::new().unwrap();
    let provider = Arc::new(FakeProvider::default());
    let engine = loaded_engine(&temp, provider.clone());

    let err = engine.query("   ", &QueryOptions::default()).await.unwrap_err();
    assert!(matches!(err, CaseQaError::InvalidInput(_)));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_status_reflects_state() {
    let temp = TempDir::new().unwrap();
    let engine = loaded_engine(&temp, Arc::new(FakeProvider::default()));

    let status = engine.status();
    assert!(status.initialized);
    assert_eq!(status.model, "gemini-2.0-flash-001");
    assert_eq!(
        status.store_resource_name.as_deref(),
        Some("fileSearchStores/fake-store")
    );
    assert_eq!(engine.name(), "Gemini File Search");
}
