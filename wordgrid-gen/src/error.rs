//! Error types for wordgrid-gen
//!
//! Pipeline failures fall into four families: configuration mistakes (never
//! retried), exhausted transient service errors, schema violations (fatal on
//! first sight) and insufficient content (retried at the group level).

use crate::llm::LlmError;
use thiserror::Error;

/// Pipeline error type
#[derive(Debug, Error)]
pub enum GenError {
    /// Unknown profile, category type or tier, or an impossible puzzle shape
    #[error("Configuration error: {0}")]
    Config(String),

    /// Every retry attempt at a call site failed with a transient error
    #[error("{step}: generation service failed after {attempts} attempts: {source}")]
    ServiceExhausted {
        step: String,
        attempts: u32,
        #[source]
        source: LlmError,
    },

    /// Response lacked the structured block or did not match the stage's shape
    #[error("{step}: schema violation: {message}")]
    SchemaViolation { step: String, message: String },

    /// A schema-valid group response had too few usable words after dedup
    #[error("Group '{category}' yielded {got}/{needed} usable words")]
    InsufficientContent {
        category: String,
        got: usize,
        needed: usize,
    },

    /// Stage 2 produced fewer candidates than groups requested
    #[error("Brainstorm produced {got} candidates, need at least {needed}")]
    NotEnoughCandidates { got: usize, needed: usize },
}

impl GenError {
    /// Short name of the error family, for logs and events
    pub fn kind(&self) -> &'static str {
        match self {
            GenError::Config(_) => "config",
            GenError::ServiceExhausted { .. } => "service_exhausted",
            GenError::SchemaViolation { .. } => "schema_violation",
            GenError::InsufficientContent { .. } => "insufficient_content",
            GenError::NotEnoughCandidates { .. } => "not_enough_candidates",
        }
    }
}

/// Result type for pipeline operations
pub type GenResult<T> = Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message_carries_last_cause() {
        let err = GenError::ServiceExhausted {
            step: "Step 1".to_string(),
            attempts: 3,
            source: LlmError::RateLimited,
        };
        let message = err.to_string();
        assert!(message.contains("Step 1"));
        assert!(message.contains("3 attempts"));
        assert!(message.contains("Rate limit"));
        assert_eq!(err.kind(), "service_exhausted");
    }
}
