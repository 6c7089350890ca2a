//! Core data types shared across the compiler and retrieval engine.

use serde::{Deserialize, Serialize};

/// A single `(id, text)` pair read from the backing store.
///
/// A read-only snapshot of one labeled node at search time. A node with a
/// null text property is represented with an empty string, never a null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorpusItem {
    /// Store-assigned node identifier
    pub id: String,

    /// Text content used for embedding (empty if the property was null)
    pub text: String,
}

/// One corpus item scored against a query embedding.
///
/// The score is a raw similarity magnitude. Under the dot-product strategy it
/// is not bounded to `[-1, 1]`; only the relative ordering is meaningful.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedResult {
    /// Store-assigned node identifier
    pub id: String,

    /// Similarity score (higher is more similar)
    pub score: f32,
}

/// A compiled query together with a phrase-to-fragment explanation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplainedQuery {
    /// The compiled GraphQL query text
    pub query: String,

    /// Ordered mapping from prompt sub-phrases to generated query fragments
    pub mapping: Vec<MappingEntry>,
}

/// One entry of an [`ExplainedQuery`] mapping.
///
/// Ids are `"m0"`, `"m1"`, … assigned in response order when the structured
/// payload is post-processed. They are stable handles for UI or audit use
/// within one `ExplainedQuery` and carry no meaning outside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappingEntry {
    /// Sequential identifier ("m0", "m1", …)
    pub id: String,

    /// The prompt sub-phrase this entry explains
    pub source_phrase: String,

    /// The query fragment generated for that phrase
    pub generated_fragment: String,
}
