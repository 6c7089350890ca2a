//! Chat completion provider abstraction and the OpenAI implementation.

use crate::types::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

/// A function-call contract forced on the model in structured mode.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    /// Function name the model is forced to call
    pub name: String,
    /// JSON Schema of the function arguments
    pub parameters: serde_json::Value,
}

/// Chat completion provider.
///
/// Two modes: free-text completion, and a forced function call that returns
/// the parsed arguments payload. Implementations are injected into the
/// compilers so tests can script responses without a network.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Complete a system/user message pair as free text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Complete with a forced function call.
    ///
    /// Returns `Ok(None)` when the provider ignored the forced call and
    /// produced no arguments. Callers decide whether that is fatal.
    async fn call_function(
        &self,
        system: &str,
        user: &str,
        function: &FunctionSpec,
    ) -> Result<Option<serde_json::Value>>;
}

/// OpenAI API response for chat completions.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    arguments: String,
}

/// OpenAI chat completion provider.
pub struct OpenAiChat {
    api_key: String,
    model: String,
    client: Client,
}

impl OpenAiChat {
    /// Create a new provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key
    /// * `model` - Chat model name (e.g. "o4-mini")
    /// * `client` - Shared HTTP client carrying the request deadline
    pub fn new(api_key: String, model: String, client: Client) -> Self {
        Self {
            api_key,
            model,
            client,
        }
    }

    async fn post(&self, payload: serde_json::Value) -> Result<ChatResponse> {
        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ModelContract(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ChatProvider for OpenAiChat {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let parsed = self
            .post(json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": user}
                ]
            }))
            .await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::ModelContract("empty completion from OpenAI".to_string()))
    }

    async fn call_function(
        &self,
        system: &str,
        user: &str,
        function: &FunctionSpec,
    ) -> Result<Option<serde_json::Value>> {
        let parsed = self
            .post(json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": user}
                ],
                "functions": [
                    {"name": function.name, "parameters": function.parameters}
                ],
                "function_call": {"name": function.name}
            }))
            .await?;

        let call = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.function_call);

        match call {
            // Arguments arrive as a JSON-encoded string.
            Some(call) => Ok(Some(serde_json::from_str(&call.arguments).map_err(
                |e| Error::ModelContract(format!("unparseable function arguments: {}", e)),
            )?)),
            None => Ok(None),
        }
    }
}
