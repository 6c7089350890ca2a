//! GraphQL schema introspection client.
//!
//! Fetches the full type system from a GraphQL endpoint using the standard
//! introspection query and deserializes it into a typed model the SDL
//! renderer can walk.

use crate::types::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// Standard introspection query covering types, fields, arguments, enum
/// values, input fields, and union members. Type references are unrolled to
/// seven levels, enough for any practical wrapping depth.
const INTROSPECTION_QUERY: &str = r#"
query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    types {
      kind
      name
      description
      fields(includeDeprecated: false) {
        name
        args {
          name
          type { ...TypeRef }
          defaultValue
        }
        type { ...TypeRef }
      }
      inputFields {
        name
        type { ...TypeRef }
        defaultValue
      }
      enumValues(includeDeprecated: false) {
        name
      }
      possibleTypes { ...TypeRef }
    }
  }
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// The introspected type system of one endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaModel {
    /// Query root type name
    #[serde(rename = "queryType")]
    pub query_type: Option<NamedType>,

    /// Mutation root type name, if the schema has one
    #[serde(rename = "mutationType")]
    pub mutation_type: Option<NamedType>,

    /// Every type the endpoint exposes, including built-ins
    pub types: Vec<TypeDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedType {
    pub name: String,
}

/// One introspected type definition.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeDef {
    pub kind: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub fields: Option<Vec<FieldDef>>,
    #[serde(rename = "inputFields")]
    pub input_fields: Option<Vec<InputValue>>,
    #[serde(rename = "enumValues")]
    pub enum_values: Option<Vec<EnumValue>>,
    #[serde(rename = "possibleTypes")]
    pub possible_types: Option<Vec<TypeRef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub args: Vec<InputValue>,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputValue {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(rename = "defaultValue")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumValue {
    pub name: String,
}

/// A possibly-wrapped type reference (`NON_NULL` / `LIST` chains).
#[derive(Debug, Clone, Deserialize)]
pub struct TypeRef {
    pub kind: String,
    pub name: Option<String>,
    #[serde(rename = "ofType")]
    pub of_type: Option<Box<TypeRef>>,
}

impl SchemaModel {
    /// Parse a raw introspection response body into a schema model.
    ///
    /// # Errors
    ///
    /// Returns `Error::Introspection` if the body carries GraphQL errors or
    /// lacks the `data.__schema` payload.
    pub fn from_response(body: serde_json::Value) -> Result<Self> {
        if let Some(errors) = body.get("errors") {
            return Err(Error::Introspection(format!(
                "endpoint returned errors: {}",
                errors
            )));
        }

        let schema = body
            .get("data")
            .and_then(|d| d.get("__schema"))
            .cloned()
            .ok_or_else(|| {
                Error::Introspection("response missing data.__schema".to_string())
            })?;

        serde_json::from_value(schema)
            .map_err(|e| Error::Introspection(format!("malformed introspection payload: {}", e)))
    }
}

/// Client that introspects a GraphQL endpoint.
pub struct SchemaClient {
    endpoint: String,
    client: Client,
}

impl SchemaClient {
    /// Create a client for the given endpoint.
    pub fn new(endpoint: String, client: Client) -> Self {
        Self { endpoint, client }
    }

    /// Fetch and parse the endpoint's type system.
    ///
    /// # Errors
    ///
    /// Returns `Error::Introspection` on non-success status or an
    /// unparseable response, `Error::Http` on transport failure.
    pub async fn fetch_schema(&self) -> Result<SchemaModel> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": INTROSPECTION_QUERY }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Introspection(format!(
                "endpoint returned {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = response.json().await?;
        SchemaModel::from_response(body)
    }

    /// Fetch the schema and render it as canonical SDL text.
    ///
    /// This is the form handed to the query compiler as grounding context.
    pub async fn fetch_sdl(&self) -> Result<String> {
        let schema = self.fetch_schema().await?;
        Ok(super::render::render_sdl(&schema))
    }
}
