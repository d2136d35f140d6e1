//! # lodestar-cli
//!
//! The `lodestar` binary: an interactive RAG shell plus the offline
//! index-build and evaluation commands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod chat;
pub mod eval;
pub mod index;
pub mod spinner;

/// Local RAG assistant: retrieve, generate, evaluate.
#[derive(Debug, Parser)]
#[command(name = "lodestar", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive question-answering shell.
    Chat(ChatArgs),
    /// Build the vector index and corpus store from a directory of .txt files.
    Index(IndexArgs),
    /// Run the full evaluation over a test-query file.
    Eval(EvalArgs),
}

/// Connection settings shared by every subcommand.
#[derive(Debug, Args)]
pub struct BackendArgs {
    /// Base URL of the Ollama-compatible inference server.
    #[arg(long, default_value = "http://localhost:11434")]
    pub base_url: String,

    /// Generation model name.
    #[arg(long, default_value = "mistral")]
    pub model: String,

    /// Embedding model name.
    #[arg(long, default_value = "nomic-embed-text")]
    pub embed_model: String,

    /// Path to a tokenizer.json for exact token budgeting. Without it,
    /// budgeting falls back to a characters-per-token approximation.
    #[arg(long)]
    pub tokenizer: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Path to the vector index artifact.
    #[arg(long, default_value = "data/index.json")]
    pub index_path: PathBuf,

    /// Path to the corpus store artifact.
    #[arg(long, default_value = "data/corpus.json")]
    pub corpus_path: PathBuf,

    /// Show per-query latency and CPU/RAM readings.
    #[arg(long)]
    pub show_metrics: bool,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Directory of .txt corpus files.
    pub corpus_dir: PathBuf,

    /// Path to write the vector index artifact.
    #[arg(long, default_value = "data/index.json")]
    pub index_path: PathBuf,

    /// Path to write the corpus store artifact.
    #[arg(long, default_value = "data/corpus.json")]
    pub corpus_path: PathBuf,
}

#[derive(Debug, Args)]
pub struct EvalArgs {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Test-query file, one query per line.
    pub test_set: PathBuf,

    /// Path to write the evaluation report.
    #[arg(long, default_value = "data/evaluation_results.json")]
    pub output: PathBuf,

    /// Path to the vector index artifact (retrieval latency is skipped if
    /// the artifacts are absent).
    #[arg(long, default_value = "data/index.json")]
    pub index_path: PathBuf,

    /// Path to the corpus store artifact.
    #[arg(long, default_value = "data/corpus.json")]
    pub corpus_path: PathBuf,
}
