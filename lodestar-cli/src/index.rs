//! The offline index-build command.

use std::fs;

use anyhow::Context;

use lodestar_model::{OllamaConfig, OllamaEmbedder};
use lodestar_rag::EmbeddingIndex;

use crate::IndexArgs;

pub async fn run(args: IndexArgs) -> anyhow::Result<()> {
    let embedder = OllamaEmbedder::connect(OllamaConfig::new(
        &args.backend.base_url,
        &args.backend.embed_model,
    ))
    .await
    .context("connecting embedding backend")?;

    let mut paths: Vec<_> = fs::read_dir(&args.corpus_dir)
        .with_context(|| format!("reading corpus dir {}", args.corpus_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    // Sorted so index builds are deterministic across filesystems.
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in &paths {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        documents.push(text);
    }
    anyhow::ensure!(
        !documents.is_empty(),
        "no .txt files found in {}",
        args.corpus_dir.display()
    );

    let index =
        EmbeddingIndex::build(documents, &embedder, &args.backend.embed_model).await?;
    index.save(&args.index_path, &args.corpus_path)?;

    println!(
        "Indexed {} documents ({} dimensions) -> {} + {}",
        index.len(),
        index.dimensions(),
        args.index_path.display(),
        args.corpus_path.display(),
    );
    Ok(())
}
