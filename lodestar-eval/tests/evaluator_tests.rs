//! Evaluation-harness tests against deterministic backends.

use std::fs;
use std::sync::Arc;

use lodestar_eval::Evaluator;
use lodestar_model::{CharTokenizer, MockEmbedder, MockFailure, MockModel};
use lodestar_rag::{EmbeddingIndex, Retriever};

fn evaluator_with(model: MockModel) -> Evaluator {
    Evaluator::new(Arc::new(model), Arc::new(CharTokenizer))
}

#[tokio::test]
async fn perplexity_is_exp_of_mean_window_nll() {
    let evaluator = evaluator_with(MockModel::new("ok").with_nll(1.0));
    let perplexity = evaluator.perplexity("what is a neural network").await;
    assert!((perplexity - std::f64::consts::E).abs() < 1e-9);
}

#[tokio::test]
async fn perplexity_of_empty_text_is_the_sentinel() {
    let evaluator = evaluator_with(MockModel::new("ok"));
    assert!(evaluator.perplexity("").await.is_infinite());
}

#[tokio::test]
async fn perplexity_failure_reports_the_sentinel() {
    let evaluator =
        evaluator_with(MockModel::new("ok").with_poison_token(u32::from('X')));
    assert!(evaluator.perplexity("query with an X inside").await.is_infinite());
}

#[tokio::test]
async fn long_text_is_scored_across_windows() {
    // 2000 chars tokenize to 2000 ids under CharTokenizer: several
    // windows at length 512, stride 128.
    let evaluator = evaluator_with(MockModel::new("ok").with_nll(0.5));
    let long_text = "a".repeat(2000);
    let perplexity = evaluator.perplexity(&long_text).await;
    assert!((perplexity - 0.5f64.exp()).abs() < 1e-9);
}

#[tokio::test]
async fn speed_reports_non_negative_stats() {
    let evaluator = evaluator_with(MockModel::new("fast answer"));
    let agg = evaluator.speed("a test query", 3).await;
    assert!(agg.mean >= 0.0);
    assert!(agg.std >= 0.0);
    assert!(agg.mean.is_finite());
}

#[tokio::test]
async fn speed_failure_reports_the_sentinel() {
    let evaluator =
        evaluator_with(MockModel::new("x").with_failure(MockFailure::Inference));
    let agg = evaluator.speed("a test query", 3).await;
    assert!(agg.mean.is_infinite());
    assert!(agg.std.is_infinite());
}

#[tokio::test]
async fn memory_footprint_converts_bytes_to_mb_and_gb() {
    let evaluator =
        evaluator_with(MockModel::new("ok").with_memory_footprint(512 * 1024 * 1024));
    let memory = evaluator.memory_footprint();
    assert!((memory.model_size_mb - 512.0).abs() < 1e-9);
    assert!((memory.model_size_gb - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn unknown_memory_footprint_reports_the_sentinel() {
    let evaluator = evaluator_with(MockModel::new("ok"));
    assert!(evaluator.memory_footprint().model_size_mb.is_infinite());
}

#[tokio::test]
async fn retrieval_latency_requires_a_retriever() {
    let evaluator = evaluator_with(MockModel::new("ok"));
    assert!(evaluator.retrieval_latency(&["q".to_string()]).await.is_none());
}

#[tokio::test]
async fn retrieval_latency_reports_non_negative_stats() {
    let embedder = MockEmbedder::new(4);
    let index = EmbeddingIndex::build(
        vec!["first document".to_string(), "second document".to_string()],
        &embedder,
        "mock-embedder",
    )
    .await
    .unwrap();
    let retriever = Arc::new(Retriever::new(Arc::new(embedder), index).unwrap());

    let evaluator = evaluator_with(MockModel::new("ok")).with_retriever(retriever);
    let agg = evaluator
        .retrieval_latency(&["one query".to_string(), "another query".to_string()])
        .await
        .unwrap();
    assert!(agg.mean >= 0.0);
    assert!(agg.mean.is_finite());
}

#[tokio::test]
async fn full_evaluation_produces_one_record_per_query_despite_failures() {
    let dir = tempfile::tempdir().unwrap();
    let test_set = dir.path().join("test_set.txt");
    fs::write(&test_set, "what is rust\npoisoned X query\nwhat is a vector index\n\n").unwrap();

    let output = dir.path().join("results").join("evaluation.json");

    let evaluator = evaluator_with(
        MockModel::new("answer").with_nll(1.0).with_poison_token(u32::from('X')),
    );
    let report =
        evaluator.run_full_evaluation(&test_set, Some(&output)).await.unwrap();

    // Exactly one record per non-empty test line.
    assert_eq!(report.queries.len(), 3);
    assert!(report.queries[0].perplexity.is_finite());
    assert!(report.queries[1].perplexity.is_infinite());
    assert!(report.queries[2].perplexity.is_finite());
    assert!(report.latency.mean >= 0.0);
    assert!(report.latency.std >= 0.0);

    // The report artifact exists and carries the same records.
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["queries"].as_array().unwrap().len(), 3);
    assert!(written["queries"][1]["perplexity"].is_null());
}

#[tokio::test]
async fn missing_test_set_aborts_the_run() {
    let evaluator = evaluator_with(MockModel::new("ok"));
    let result = evaluator
        .run_full_evaluation("/nonexistent/test_set.txt", None)
        .await;
    assert!(result.is_err());
}
