//! Data types for retrieved documents.

use serde::{Deserialize, Serialize};

/// A corpus document returned by retrieval.
///
/// Documents carry no id of their own; the corpus position is the identity,
/// and row *i* of the vector index always corresponds to document *i* of
/// the corpus store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Position of the document in the corpus store.
    pub index: usize,
    /// Full document text.
    pub text: String,
    /// Squared Euclidean distance to the query embedding. Lower is closer.
    pub distance: f32,
}
