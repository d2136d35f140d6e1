//! # lodestar-rag
//!
//! Retrieval and generation orchestration: the core of the Lodestar RAG
//! pipeline.
//!
//! A query flows through [`RagModel::generate_response`] as:
//!
//! safety filter → query refiner → retriever (embed + exact search) →
//! context budgeter → prompt assembly → generation model → post-processing
//!
//! Construction-time failures (missing or incoherent index artifacts,
//! unloadable backends) are surfaced as errors and abort startup.
//! Per-query failures never escape: retrieval degrades to "no context",
//! generation degrades to a textual error response with empty sources.
//!
//! # Example
//!
//! ```rust,ignore
//! use lodestar_rag::{EmbeddingIndex, RagConfig, RagModel, Retriever};
//!
//! let index = EmbeddingIndex::load("data/index.json", "data/corpus.json")?;
//! let retriever = Retriever::new(embedder, index)?;
//! let rag = RagModel::builder()
//!     .config(RagConfig::default())
//!     .model(model)
//!     .tokenizer(tokenizer)
//!     .retriever(retriever)
//!     .build()?;
//!
//! let outcome = rag.generate_response("What is a neural network?").await;
//! println!("{}", outcome.text);
//! ```

pub mod budget;
pub mod config;
pub mod document;
pub mod error;
pub mod generation;
pub mod index;
pub mod postprocess;
pub mod prompt;
pub mod refine;
pub mod retriever;
pub mod safety;

pub use budget::ContextBudgeter;
pub use config::{RagConfig, RagConfigBuilder};
pub use document::RetrievedDocument;
pub use error::{RagError, Result};
pub use generation::{RagModel, RagModelBuilder, RagResponse, REFUSAL_MESSAGE};
pub use index::EmbeddingIndex;
pub use prompt::PromptBuilder;
pub use refine::QueryRefiner;
pub use retriever::Retriever;
pub use safety::SafetyFilter;
