//! Anthropic Messages API client
//!
//! Forces structured output through `tool_use` with a pinned `tool_choice`,
//! so every successful call yields exactly the tool's input object.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{LlmError, StructuredClient, StructuredOutput, StructuredRequest, TokenUsage};

/// Default model when none is configured
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Anthropic API client
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    http_client: reqwest::Client,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    input: Option<serde_json::Value>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Usage,
}

impl AnthropicClient {
    /// Create a client for the given key and model
    pub fn new(api_key: String, model: &str) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self {
            api_key,
            http_client,
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (proxy, local stub)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn request_body(&self, request: &StructuredRequest) -> serde_json::Value {
        serde_json::json!({
            "model": &self.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "tools": [{
                "name": &request.tool.name,
                "description": &request.tool.description,
                "input_schema": &request.tool.input_schema,
            }],
            "tool_choice": {"type": "tool", "name": &request.tool.name},
            "messages": [{"role": "user", "content": &request.prompt}],
        })
    }
}

/// Pull the tool input out of a decoded response body
fn extract_tool_output(response: MessagesResponse) -> Result<StructuredOutput, LlmError> {
    let usage = TokenUsage {
        input_tokens: response.usage.input_tokens,
        output_tokens: response.usage.output_tokens,
    };

    let mut text_parts = Vec::new();
    for block in response.content {
        if block.block_type == "tool_use" {
            if let Some(input) = block.input {
                return Ok(StructuredOutput { value: input, usage });
            }
        } else if let Some(text) = block.text {
            text_parts.push(text);
        }
    }

    Err(LlmError::MissingToolOutput(text_parts.join(" ")))
}

#[async_trait]
impl StructuredClient for AnthropicClient {
    async fn invoke(&self, request: &StructuredRequest) -> Result<StructuredOutput, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        tracing::debug!(tool = %request.tool.name, temperature = request.temperature, "Calling Anthropic API");

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(status.as_u16(), body));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let output = extract_tool_output(body)?;
        tracing::debug!(
            tool = %request.tool.name,
            input_tokens = output.usage.input_tokens,
            output_tokens = output.usage.output_tokens,
            "Anthropic API call complete"
        );
        Ok(output)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
