//! Structured generation client
//!
//! Provider-agnostic interface for a text-generation service that is forced to
//! answer through a single tool schema. The orchestration code only sees
//! [`StructuredClient`]; tests substitute scripted implementations.

pub mod anthropic;
pub mod retry;

pub use anthropic::AnthropicClient;
pub use retry::{invoke_with_retry, RetryPolicy};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GenError;

/// Generation service errors
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Successful response without the forced tool output block
    #[error("No tool_use block in response despite forced tool_choice: {0}")]
    MissingToolOutput(String),
}

impl LlmError {
    /// Whether a retry can plausibly succeed
    pub fn is_transient(&self) -> bool {
        !matches!(self, LlmError::MissingToolOutput(_))
    }
}

/// Tool definition that forces the output shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema of the tool input
    pub input_schema: serde_json::Value,
}

/// One schema-constrained generation request
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub prompt: String,
    pub tool: ToolSchema,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Token usage reported by the service for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Structured result of one call
#[derive(Debug, Clone)]
pub struct StructuredOutput {
    /// Tool input as produced by the service
    pub value: serde_json::Value,
    pub usage: TokenUsage,
}

impl StructuredOutput {
    /// Deserialize the tool input into a stage type
    ///
    /// A value that does not fit the stage's type is a schema violation.
    pub fn decode<T: DeserializeOwned>(&self, step: &str) -> Result<T, GenError> {
        serde_json::from_value(self.value.clone()).map_err(|e| GenError::SchemaViolation {
            step: step.to_string(),
            message: e.to_string(),
        })
    }
}

/// Client for a schema-constrained generation service
#[async_trait]
pub trait StructuredClient: Send + Sync {
    /// Invoke the service once, forcing the request's tool schema
    async fn invoke(&self, request: &StructuredRequest) -> Result<StructuredOutput, LlmError>;

    /// Model name for metadata and logging
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_output_is_not_transient() {
        assert!(!LlmError::MissingToolOutput("text only".into()).is_transient());
        assert!(LlmError::RateLimited.is_transient());
        assert!(LlmError::Api(500, "boom".into()).is_transient());
        assert!(LlmError::Network("reset".into()).is_transient());
        assert!(LlmError::Parse("eof".into()).is_transient());
    }

    #[test]
    fn test_decode_mismatch_is_schema_violation() {
        #[derive(Debug, Deserialize)]
        struct Needs {
            #[allow(dead_code)]
            story: String,
        }

        let output = StructuredOutput {
            value: serde_json::json!({"seed_words": []}),
            usage: TokenUsage::default(),
        };
        let result: Result<Needs, _> = output.decode("Step 1");
        assert!(matches!(result, Err(GenError::SchemaViolation { .. })));
    }
}
