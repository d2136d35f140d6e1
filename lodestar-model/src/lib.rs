//! # lodestar-model
//!
//! Concrete backends for the `lodestar-core` boundaries.
//!
//! - [`OllamaGenerator`] / [`OllamaEmbedder`]: clients for an
//!   Ollama-compatible HTTP inference server, the usual way to run local
//!   models without linking a runtime into this process
//! - [`HfTokenizer`]: a HuggingFace `tokenizers` vocabulary loaded from a
//!   `tokenizer.json` file
//! - [`mock`]: deterministic test doubles used across the workspace

pub mod hf;
pub mod mock;
pub mod ollama;

pub use hf::HfTokenizer;
pub use mock::{CharTokenizer, MockEmbedder, MockFailure, MockModel};
pub use ollama::{OllamaConfig, OllamaEmbedder, OllamaGenerator};
