//! Shared types: errors and the core data model.

pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::{CorpusItem, ExplainedQuery, MappingEntry, RankedResult};
