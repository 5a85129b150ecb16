//! End-to-end session tests: files on disk through ingestion, retrieval and
//! answer generation, with a mock LLM.

mod common;

use common::fixture_dir;
use common::mocks::{FailingEmbedder, MockLLMClient};
use docqa::agents::retrieval::EngineStatus;
use docqa::agents::{IngestionAgent, LLMResponseAgent, RetrievalAgent, RetrievalConfig};
use docqa::pipeline::Pipeline;
use docqa::rag::HashEmbedder;
use docqa::AppError;
use std::sync::Arc;

fn retrieval(chunk_size: usize, overlap: usize) -> RetrievalAgent {
    RetrievalAgent::new(
        RetrievalConfig {
            chunk_size,
            chunk_overlap: overlap,
            default_top_k: 3,
        },
        Arc::new(HashEmbedder::new(256).unwrap()),
    )
    .unwrap()
}

fn pipeline_with(llm: MockLLMClient) -> Pipeline {
    Pipeline::new(
        IngestionAgent::new(),
        retrieval(80, 20),
        Some(LLMResponseAgent::new(Box::new(llm))),
    )
    .with_trace_id("session-1")
}

const HANDBOOK: &str = "Shipping is free for orders above fifty euros. \
                        Returns are accepted within thirty days of delivery. \
                        Support is available on weekdays from nine to five.";

const PRICES: &str = "item,price\nlamp,25\ndesk,180\n";

#[tokio::test]
async fn test_ingest_reports_parsed_files_and_chunks() {
    let (_dir, paths) = fixture_dir(&[("handbook.md", HANDBOOK), ("prices.csv", PRICES)]);
    let pipeline = pipeline_with(MockLLMClient::new("ok"));

    let report = pipeline.ingest_files(&paths).await.unwrap();

    assert_eq!(report.parsed, vec!["handbook.md", "prices.csv"]);
    assert!(report.failures.is_empty());
    assert!(report.num_chunks > 1);
    assert!(matches!(
        pipeline.status(),
        EngineStatus::Ready { num_chunks, .. } if num_chunks == report.num_chunks
    ));
}

#[tokio::test]
async fn test_failing_file_is_skipped() {
    let (dir, mut paths) = fixture_dir(&[("handbook.md", HANDBOOK), ("slides.pptx", "binary")]);
    paths.push(dir.path().join("missing.txt"));
    let pipeline = pipeline_with(MockLLMClient::new("ok"));

    let report = pipeline.ingest_files(&paths).await.unwrap();

    assert_eq!(report.parsed, vec!["handbook.md"]);
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures[0].error.contains("pptx"));
    assert!(report.failures[1].error.contains("missing.txt"));
}

#[tokio::test]
async fn test_all_files_failing_is_empty_input() {
    let (_dir, paths) = fixture_dir(&[("blank.txt", "   \n"), ("deck.pptx", "binary")]);
    let pipeline = pipeline_with(MockLLMClient::new("ok"));

    let err = pipeline.ingest_files(&paths).await.unwrap_err();

    assert!(matches!(err, AppError::EmptyInput(_)));
    assert_eq!(pipeline.status(), EngineStatus::Empty);
}

#[tokio::test]
async fn test_ask_returns_answer_grounded_in_chunks() {
    let llm = MockLLMClient::new("Orders above fifty euros ship for free.");
    let prompts = llm.prompts();
    let (_dir, paths) = fixture_dir(&[("handbook.md", HANDBOOK)]);
    let pipeline = pipeline_with(llm);
    pipeline.ingest_files(&paths).await.unwrap();

    let answer = pipeline
        .ask("Is shipping free above fifty euros?", Some(2))
        .await
        .unwrap();

    assert_eq!(answer.answer, "Orders above fifty euros ship for free.");
    assert_eq!(answer.query, "Is shipping free above fifty euros?");
    assert_eq!(answer.trace_id, "session-1");
    assert_eq!(answer.used_chunks.len(), 2);

    let prompts = prompts.lock();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Question: Is shipping free above fifty euros?"));
    for chunk in &answer.used_chunks {
        assert!(prompts[0].contains(chunk.as_str()));
    }
}

#[tokio::test]
async fn test_ask_before_ingest_is_not_ready() {
    let llm = MockLLMClient::new("unused");
    let prompts = llm.prompts();
    let pipeline = pipeline_with(llm);

    let err = pipeline.ask("anything?", None).await.unwrap_err();

    assert_eq!(err.to_string(), AppError::NotReady.to_string());
    assert!(prompts.lock().is_empty());
}

#[tokio::test]
async fn test_llm_failure_keeps_index_usable() {
    let (_dir, paths) = fixture_dir(&[("handbook.md", HANDBOOK)]);
    let pipeline = pipeline_with(MockLLMClient::failing());
    pipeline.ingest_files(&paths).await.unwrap();

    let err = pipeline.ask("When is support open?", None).await.unwrap_err();
    assert_eq!(err.to_string(), "LLM error: Mock LLM failure");

    let chunks = pipeline.retrieve("When is support open?", Some(1)).await.unwrap();
    assert_eq!(chunks.len(), 1);
}

#[tokio::test]
async fn test_reingest_replaces_previous_documents() {
    let (_dir, first) = fixture_dir(&[("handbook.md", HANDBOOK)]);
    let (_dir2, second) = fixture_dir(&[("prices.csv", PRICES)]);
    let pipeline = pipeline_with(MockLLMClient::new("ok"));

    pipeline.ingest_files(&first).await.unwrap();
    pipeline.ingest_files(&second).await.unwrap();

    let chunks = pipeline.retrieve("shipping returns support", Some(10)).await.unwrap();
    assert!(chunks.iter().all(|c| !c.contains("Shipping")));
    assert!(matches!(pipeline.status(), EngineStatus::Ready { version: 2, .. }));
}

#[tokio::test]
async fn test_retrieve_default_top_k_from_config() {
    let (_dir, paths) = fixture_dir(&[("handbook.md", HANDBOOK)]);
    let pipeline = Pipeline::new(IngestionAgent::new(), retrieval(20, 0), None);
    pipeline.ingest_files(&paths).await.unwrap();

    let chunks = pipeline.retrieve("delivery", None).await.unwrap();

    assert_eq!(chunks.len(), 3);
}

#[tokio::test]
async fn test_rejected_rebuild_still_reports_skipped_files() {
    let (_dir, paths) = fixture_dir(&[("handbook.md", HANDBOOK), ("deck.pptx", "binary")]);
    let retrieval = RetrievalAgent::new(RetrievalConfig::default(), Arc::new(FailingEmbedder))
        .unwrap();
    let pipeline = Pipeline::new(IngestionAgent::new(), retrieval, None);

    let err = pipeline.ingest_files(&paths).await.unwrap_err();

    assert!(matches!(err, AppError::Downstream(_)));
    let message = err.to_string();
    assert!(message.starts_with("Embedding error: Mock embedding failure"));
    assert!(message.contains("deck.pptx"));
    assert!(message.contains("Unsupported file type: pptx"));
}
