//! Graph store abstraction and the Neo4j implementation.

use crate::types::{CorpusItem, Error, Result};
use async_trait::async_trait;
use neo4rs::{query, Graph};

/// Read-only access to the labeled nodes backing semantic search.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Fetch every `(id, text)` pair for nodes with the given label.
    ///
    /// A null text property comes back as an empty string.
    async fn fetch_corpus(&self, label: &str, text_property: &str) -> Result<Vec<CorpusItem>>;

    /// Fetch full node records for the given ids, in store order.
    async fn fetch_by_ids(&self, label: &str, ids: &[String]) -> Result<Vec<serde_json::Value>>;
}

/// Neo4j-backed [`GraphStore`].
pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    /// Connect to a Neo4j instance over Bolt.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the connection cannot be established.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .map_err(|e| Error::Store(format!("connection failed: {}", e)))?;
        Ok(Self { graph })
    }
}

/// Labels and property names are interpolated into Cypher text (they cannot
/// be bound as parameters), so they are restricted to identifier characters.
fn ensure_identifier(value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::Store(format!("invalid identifier: {:?}", value)))
    }
}

fn corpus_query(label: &str, text_property: &str) -> String {
    format!(
        "MATCH (n:{}) RETURN n.id AS id, coalesce(n.{}, \"\") AS text",
        label, text_property
    )
}

fn records_query(label: &str) -> String {
    format!(
        "MATCH (n:{}) WHERE n.id IN $ids RETURN properties(n) AS record",
        label
    )
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn fetch_corpus(&self, label: &str, text_property: &str) -> Result<Vec<CorpusItem>> {
        ensure_identifier(label)?;
        ensure_identifier(text_property)?;

        let mut rows = self
            .graph
            .execute(query(&corpus_query(label, text_property)))
            .await
            .map_err(|e| Error::Store(format!("corpus query failed: {}", e)))?;

        let mut items = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| Error::Store(format!("corpus row failed: {}", e)))?
        {
            let id: String = row
                .get("id")
                .map_err(|e| Error::Store(format!("missing id column: {}", e)))?;
            let text: String = row
                .get("text")
                .map_err(|e| Error::Store(format!("missing text column: {}", e)))?;
            items.push(CorpusItem { id, text });
        }
        Ok(items)
    }

    async fn fetch_by_ids(&self, label: &str, ids: &[String]) -> Result<Vec<serde_json::Value>> {
        ensure_identifier(label)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut rows = self
            .graph
            .execute(query(&records_query(label)).param("ids", ids.to_vec()))
            .await
            .map_err(|e| Error::Store(format!("record query failed: {}", e)))?;

        let mut records = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| Error::Store(format!("record row failed: {}", e)))?
        {
            let record: serde_json::Value = row
                .get("record")
                .map_err(|e| Error::Store(format!("missing record column: {}", e)))?;
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_query_coalesces_null_text() {
        let q = corpus_query("Movie", "synopsis");
        assert_eq!(
            q,
            "MATCH (n:Movie) RETURN n.id AS id, coalesce(n.synopsis, \"\") AS text"
        );
    }

    #[test]
    fn test_records_query_binds_ids() {
        let q = records_query("Movie");
        assert!(q.contains("WHERE n.id IN $ids"));
        assert!(q.contains("properties(n) AS record"));
    }

    #[test]
    fn test_ensure_identifier() {
        assert!(ensure_identifier("Movie").is_ok());
        assert!(ensure_identifier("plot_summary").is_ok());
        assert!(ensure_identifier("").is_err());
        assert!(ensure_identifier("1Movie").is_err());
        assert!(ensure_identifier("Movie) DETACH DELETE (n").is_err());
    }
}
