//! Property tests for retrieval ordering and context budgeting.

use std::sync::Arc;

use lodestar_core::Tokenizer;
use lodestar_model::{CharTokenizer, MockEmbedder};
use lodestar_rag::document::RetrievedDocument;
use lodestar_rag::{ContextBudgeter, EmbeddingIndex, PromptBuilder, Retriever};
use proptest::prelude::*;

const DIM: usize = 8;

fn arb_vector() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, DIM)
}

/// For any corpus and query, retrieval returns at most `top_k` documents,
/// at most the corpus size, ordered by non-decreasing distance.
mod prop_retrieval_ordering {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn results_are_bounded_and_sorted(
            vectors in proptest::collection::vec(arb_vector(), 0..16),
            query in arb_vector(),
            top_k in 1usize..20,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let documents: Vec<String> =
                    (0..vectors.len()).map(|i| format!("document {i}")).collect();

                let mut embedder = MockEmbedder::new(DIM).with_vector("query", query.clone());
                for (text, vector) in documents.iter().zip(vectors.iter()) {
                    embedder = embedder.with_vector(text.clone(), vector.clone());
                }

                let index =
                    EmbeddingIndex::build(documents, &embedder, "mock-embedder").await.unwrap();
                let corpus_size = index.len();
                let retriever = Retriever::new(Arc::new(embedder), index).unwrap();
                (retriever.retrieve("query", top_k).await, corpus_size)
            });

            let (results, corpus_size) = results;

            prop_assert!(results.len() <= top_k);
            prop_assert!(results.len() <= corpus_size);
            for pair in results.windows(2) {
                prop_assert!(
                    pair[0].distance <= pair[1].distance,
                    "distances not ascending: {} > {}",
                    pair[0].distance,
                    pair[1].distance,
                );
            }
        }
    }
}

/// For 0–5 documents of arbitrary length, the budgeted, assembled, and
/// defensively truncated prompt never exceeds the input window.
mod prop_budget_fits_window {
    use super::*;

    const MAX_INPUT: usize = 2048;
    const OVERHEAD: usize = 100;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn assembled_prompt_never_exceeds_max_input(
            texts in proptest::collection::vec("[a-z ]{0,4000}", 0..=5),
            query in "[a-z ?]{1,200}",
        ) {
            let tokenizer = CharTokenizer;
            let system = "You are a helpful assistant.";
            let documents: Vec<RetrievedDocument> = texts
                .into_iter()
                .enumerate()
                .map(|(index, text)| RetrievedDocument { index, text, distance: 0.0 })
                .collect();

            let used = tokenizer.token_count(system).unwrap()
                + tokenizer.token_count(&query).unwrap();
            let budgeter = ContextBudgeter::new(MAX_INPUT, OVERHEAD, 2);
            let excerpts = budgeter.excerpts(&tokenizer, used, &documents).unwrap();

            let prompt = PromptBuilder::new(system).build(&excerpts, &query);
            let prompt = tokenizer.truncate(&prompt, MAX_INPUT).unwrap();

            prop_assert!(tokenizer.token_count(&prompt).unwrap() <= MAX_INPUT);
        }
    }
}
