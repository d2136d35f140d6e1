//! The interactive question-answering shell.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use lodestar_core::{ApproxTokenizer, Tokenizer};
use lodestar_eval::ResourceMonitor;
use lodestar_model::{HfTokenizer, OllamaConfig, OllamaEmbedder, OllamaGenerator};
use lodestar_rag::{EmbeddingIndex, RagConfig, RagModel, Retriever};

use crate::spinner::Spinner;
use crate::{BackendArgs, ChatArgs};

pub(crate) fn load_tokenizer(backend: &BackendArgs) -> anyhow::Result<Arc<dyn Tokenizer>> {
    Ok(match &backend.tokenizer {
        Some(path) => Arc::new(
            HfTokenizer::from_file(path)
                .with_context(|| format!("loading tokenizer {}", path.display()))?,
        ),
        None => Arc::new(ApproxTokenizer::default()),
    })
}

pub async fn run(args: ChatArgs) -> anyhow::Result<()> {
    let generator = Arc::new(
        OllamaGenerator::connect(OllamaConfig::new(&args.backend.base_url, &args.backend.model))
            .await
            .context("connecting generation backend")?,
    );
    let embedder = Arc::new(
        OllamaEmbedder::connect(OllamaConfig::new(
            &args.backend.base_url,
            &args.backend.embed_model,
        ))
        .await
        .context("connecting embedding backend")?,
    );
    let tokenizer = load_tokenizer(&args.backend)?;

    let index = EmbeddingIndex::load(&args.index_path, &args.corpus_path)?;
    let retriever = Arc::new(Retriever::new(embedder, index)?);

    let rag = RagModel::builder()
        .config(RagConfig::default())
        .model(generator)
        .tokenizer(tokenizer)
        .retriever(retriever)
        .build()?;

    let mut monitor = ResourceMonitor::new();
    let mut editor = DefaultEditor::new()?;

    println!("Lodestar RAG shell. Type 'exit' to quit.");
    loop {
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }
        let _ = editor.add_history_entry(query);

        let before = monitor.sample();
        let started = Instant::now();

        let spinner = Spinner::start("thinking");
        let outcome = rag.generate_response(query).await;
        spinner.stop();

        let elapsed = started.elapsed();
        let after = monitor.sample();

        if let Some(refined) = &outcome.refined_query {
            println!("(interpreting as: {refined})");
        }
        println!("Lodestar: {}", outcome.text);

        if !outcome.sources.is_empty() {
            println!("Sources:");
            for (i, source) in outcome.sources.iter().enumerate() {
                let excerpt: String = source.text.chars().take(200).collect();
                println!("{}. {excerpt}...", i + 1);
            }
        }

        if args.show_metrics {
            println!(
                "[{:.2}s | cpu {:.1}% -> {:.1}% | ram {:.1}% -> {:.1}%]",
                elapsed.as_secs_f64(),
                before.cpu_percent,
                after.cpu_percent,
                before.ram_percent,
                after.ram_percent,
            );
        }
    }

    println!("Goodbye.");
    Ok(())
}
