//! The evaluation command.

use std::sync::Arc;

use anyhow::Context;

use lodestar_eval::Evaluator;
use lodestar_model::{OllamaConfig, OllamaEmbedder, OllamaGenerator};
use lodestar_rag::{EmbeddingIndex, Retriever};

use crate::chat::load_tokenizer;
use crate::EvalArgs;

pub async fn run(args: EvalArgs) -> anyhow::Result<()> {
    let generator = Arc::new(
        OllamaGenerator::connect(OllamaConfig::new(&args.backend.base_url, &args.backend.model))
            .await
            .context("connecting generation backend")?,
    );
    let tokenizer = load_tokenizer(&args.backend)?;

    let mut evaluator = Evaluator::new(generator, tokenizer);

    // Retrieval latency is only measured when the artifacts are present.
    if args.index_path.exists() && args.corpus_path.exists() {
        let embedder = Arc::new(
            OllamaEmbedder::connect(OllamaConfig::new(
                &args.backend.base_url,
                &args.backend.embed_model,
            ))
            .await
            .context("connecting embedding backend")?,
        );
        let index = EmbeddingIndex::load(&args.index_path, &args.corpus_path)?;
        evaluator = evaluator.with_retriever(Arc::new(Retriever::new(embedder, index)?));
    }

    let report = evaluator
        .run_full_evaluation(&args.test_set, Some(args.output.as_path()))
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
