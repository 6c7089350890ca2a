//! Explainable compilation: a forced function call whose arguments carry the
//! compiled query plus a phrase-to-fragment mapping.

use crate::llm::chat::{ChatProvider, FunctionSpec};
use crate::types::{Error, ExplainedQuery, MappingEntry, Result};
use jsonschema::JSONSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

const FUNCTION_NAME: &str = "explain_translation";

/// Raw function-call payload before id assignment.
#[derive(Debug, Deserialize)]
struct ExplainPayload {
    graphql: String,
    mapping: Vec<RawMapping>,
}

#[derive(Debug, Deserialize)]
struct RawMapping {
    prompt: String,
    gql: String,
}

/// Compiles prompts into queries with a structured explanation attached.
pub struct ExplainCompiler {
    chat: Arc<dyn ChatProvider>,
}

impl ExplainCompiler {
    /// Create a compiler over the given chat provider.
    pub fn new(chat: Arc<dyn ChatProvider>) -> Self {
        Self { chat }
    }

    /// Compile a prompt and explain each generated fragment.
    ///
    /// The model is forced to call a function whose arguments carry the
    /// query and an ordered `(prompt, gql)` mapping; the payload is shape-
    /// checked and mapping entries receive sequential ids.
    ///
    /// # Errors
    ///
    /// Returns `Error::ExplanationMissing` when the provider ignored the
    /// forced call, `Error::ModelContract` when the payload fails the shape
    /// check.
    pub async fn compile_with_explanation(
        &self,
        prompt: &str,
        sdl: &str,
    ) -> Result<ExplainedQuery> {
        let system = format!(
            "You translate natural language into GraphQL queries for the schema below, and explain every generated fragment by the prompt phrase that produced it.\n\nSchema:\n{}",
            sdl
        );

        let function = FunctionSpec {
            name: FUNCTION_NAME.to_string(),
            parameters: parameters_schema(),
        };

        let payload = self
            .chat
            .call_function(&system, prompt, &function)
            .await?
            .ok_or(Error::ExplanationMissing)?;

        let explained = parse_payload(payload)?;
        debug!(entries = explained.mapping.len(), "compiled explained query");
        Ok(explained)
    }
}

/// JSON Schema of the forced function's arguments.
fn parameters_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "graphql": {
                "type": "string",
                "description": "The compiled GraphQL query"
            },
            "mapping": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "prompt": {
                            "type": "string",
                            "description": "The prompt sub-phrase"
                        },
                        "gql": {
                            "type": "string",
                            "description": "The query fragment generated for it"
                        }
                    },
                    "required": ["prompt", "gql"]
                }
            }
        },
        "required": ["graphql", "mapping"]
    })
}

/// Shape-check a payload against the function contract and assign ids.
fn parse_payload(payload: serde_json::Value) -> Result<ExplainedQuery> {
    let schema = parameters_schema();
    let compiled = JSONSchema::compile(&schema)
        .map_err(|e| Error::ModelContract(format!("invalid explanation schema: {}", e)))?;

    if !compiled.is_valid(&payload) {
        return Err(Error::ModelContract(
            "explanation payload does not match the function contract".to_string(),
        ));
    }

    let parsed: ExplainPayload = serde_json::from_value(payload)?;
    Ok(assign_mapping_ids(parsed))
}

/// Turn a raw payload into an [`ExplainedQuery`], giving entries sequential
/// `m0`, `m1`, … ids in response order.
fn assign_mapping_ids(payload: ExplainPayload) -> ExplainedQuery {
    let mapping = payload
        .mapping
        .into_iter()
        .enumerate()
        .map(|(i, entry)| MappingEntry {
            id: format!("m{}", i),
            source_phrase: entry.prompt,
            generated_fragment: entry.gql,
        })
        .collect();

    ExplainedQuery {
        query: payload.graphql,
        mapping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload_assigns_sequential_ids() {
        let payload = json!({
            "graphql": "{ movies { title } }",
            "mapping": [
                {"prompt": "all movies", "gql": "movies"},
                {"prompt": "their titles", "gql": "title"}
            ]
        });

        let explained = parse_payload(payload).unwrap();
        assert_eq!(explained.query, "{ movies { title } }");
        assert_eq!(explained.mapping[0].id, "m0");
        assert_eq!(explained.mapping[1].id, "m1");
        assert_eq!(explained.mapping[1].source_phrase, "their titles");
    }

    #[test]
    fn test_parse_payload_rejects_wrong_shape() {
        let payload = json!({
            "graphql": "{ movies { title } }",
            "mapping": [{"phrase": "all movies"}]
        });

        let err = parse_payload(payload).unwrap_err();
        assert!(matches!(err, Error::ModelContract(_)));
    }

    #[test]
    fn test_parse_payload_accepts_empty_mapping() {
        let payload = json!({"graphql": "{ people { name } }", "mapping": []});
        let explained = parse_payload(payload).unwrap();
        assert!(explained.mapping.is_empty());
    }
}
