//! Single-group composition
//!
//! [`GroupComposer`] asks the generation service for one category and its
//! candidate pool, with its own bounded retry over transient failures.

pub mod prompt;

pub use prompt::{build_group_prompt, GroupRequest};

use std::sync::Arc;

use crate::config::DEFAULT_MAX_TOKENS;
use crate::error::GenResult;
use crate::llm::{invoke_with_retry, RetryPolicy, StructuredClient, StructuredRequest};
use crate::schemas;
use crate::types::ComposedGroup;

const COMPOSE_TEMPERATURE: f32 = 0.9;

/// Generates one word group per call
#[derive(Clone)]
pub struct GroupComposer {
    client: Arc<dyn StructuredClient>,
    retry: RetryPolicy,
    max_tokens: u32,
}

impl GroupComposer {
    pub fn new(client: Arc<dyn StructuredClient>) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Compose one group
    ///
    /// The returned words are exactly what the service produced; casing and
    /// cross-group collisions are resolved by the caller.
    pub async fn compose(&self, request: &GroupRequest<'_>) -> GenResult<ComposedGroup> {
        let structured = StructuredRequest {
            prompt: build_group_prompt(request),
            tool: schemas::group_tool(),
            temperature: COMPOSE_TEMPERATURE,
            max_tokens: self.max_tokens,
        };

        let step = format!("Group {}", request.existing.len() + 1);
        tracing::debug!(
            category_type = %request.category_type,
            difficulty = %request.difficulty,
            existing = request.existing.len(),
            "Composing group"
        );

        let output = invoke_with_retry(self.client.as_ref(), &structured, &step, &self.retry).await?;
        output.decode(&step)
    }
}
