//! Backing store access.

pub mod graph;

pub use graph::{GraphStore, Neo4jStore};
