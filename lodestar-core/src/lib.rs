//! # lodestar-core
//!
//! Shared boundaries for the Lodestar RAG pipeline.
//!
//! This crate defines the traits that separate the pipeline from the
//! machine-learning backends it drives:
//!
//! - [`GenerationModel`]: text in, text out, with a bounded decoding budget
//! - [`EmbeddingModel`]: text in, fixed-dimension vector out
//! - [`Tokenizer`]: token counting, truncation, and id-level encode/decode
//!
//! Concrete backends live in `lodestar-model`; the retrieval and generation
//! orchestration in `lodestar-rag` only ever sees these traits.

pub mod embedding;
pub mod error;
pub mod model;
pub mod tokenizer;

pub use embedding::EmbeddingModel;
pub use error::{ModelError, Result};
pub use model::{GenerationModel, GenerationParams};
pub use tokenizer::{ApproxTokenizer, Tokenizer};
