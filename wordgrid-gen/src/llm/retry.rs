//! Bounded retry with exponential backoff for generation calls
//!
//! Each call site gets up to `max_attempts` tries. Between attempt n and n+1
//! the caller sleeps `base_delay * 2^(n-1)`; there is no sleep before the first
//! attempt. Non-transient errors end the loop immediately.

use std::time::Duration;

use super::{LlmError, StructuredClient, StructuredOutput, StructuredRequest};
use crate::error::{GenError, GenResult};

/// Retry schedule for one call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before `attempt` (1-based). Zero for the first attempt.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        self.base_delay * 2u32.pow(attempt - 2)
    }
}

/// Invoke `client` under `policy`, mapping the final failure to a pipeline error
///
/// `step` names the call site in logs and errors ("Step 1", "Step 3 group 2").
pub async fn invoke_with_retry(
    client: &dyn StructuredClient,
    request: &StructuredRequest,
    step: &str,
    policy: &RetryPolicy,
) -> GenResult<StructuredOutput> {
    let mut last_error: Option<LlmError> = None;

    for attempt in 1..=policy.max_attempts {
        if attempt > 1 {
            let delay = policy.backoff_delay(attempt);
            tracing::warn!(
                step,
                attempt,
                max_attempts = policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Retrying generation call"
            );
            tokio::time::sleep(delay).await;
        }

        match client.invoke(request).await {
            Ok(output) => {
                if attempt > 1 {
                    tracing::debug!(step, attempt, "Generation call succeeded after retry");
                }
                return Ok(output);
            }
            Err(err) if !err.is_transient() => {
                tracing::error!(step, attempt, error = %err, "Generation call returned no structured output");
                return Err(GenError::SchemaViolation {
                    step: step.to_string(),
                    message: err.to_string(),
                });
            }
            Err(err) => {
                tracing::error!(
                    step,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "Generation call failed"
                );
                last_error = Some(err);
            }
        }
    }

    tracing::error!(step, attempts = policy.max_attempts, "All generation attempts failed");
    Err(GenError::ServiceExhausted {
        step: step.to_string(),
        attempts: policy.max_attempts,
        source: last_error.unwrap_or_else(|| LlmError::Network("no attempts made".to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{TokenUsage, ToolSchema};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Replays a fixed list of outcomes, one per call
    struct Replay {
        outcomes: Mutex<Vec<Result<serde_json::Value, LlmError>>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl Replay {
        fn new(mut outcomes: Vec<Result<serde_json::Value, LlmError>>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StructuredClient for Replay {
        async fn invoke(&self, _request: &StructuredRequest) -> Result<StructuredOutput, LlmError> {
            self.calls.lock().unwrap().push(Instant::now());
            let next = self
                .outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(LlmError::Network("exhausted script".into())));
            next.map(|value| StructuredOutput {
                value,
                usage: TokenUsage::default(),
            })
        }

        fn model_name(&self) -> &str {
            "replay"
        }
    }

    fn request() -> StructuredRequest {
        StructuredRequest {
            prompt: "p".into(),
            tool: ToolSchema {
                name: "submit_seed".into(),
                description: String::new(),
                input_schema: serde_json::json!({}),
            },
            temperature: 1.0,
            max_tokens: 16,
        }
    }

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(1), Duration::ZERO);
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_failures_sleep_one_then_two_seconds() {
        let client = Replay::new(vec![
            Err(LlmError::RateLimited),
            Err(LlmError::Api(500, "boom".into())),
            Err(LlmError::Network("reset".into())),
        ]);

        let result = invoke_with_retry(&client, &request(), "Step 1", &RetryPolicy::default()).await;

        let times = client.call_times();
        assert_eq!(times.len(), 3);
        assert_eq!(times[1] - times[0], Duration::from_secs(1));
        assert_eq!(times[2] - times[1], Duration::from_secs(2));

        match result {
            Err(GenError::ServiceExhausted { attempts, source, .. }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(source, LlmError::Network(_)));
            }
            other => panic!("expected ServiceExhausted, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_one_retry() {
        let client = Replay::new(vec![
            Err(LlmError::RateLimited),
            Ok(serde_json::json!({"ok": true})),
        ]);

        let output = invoke_with_retry(&client, &request(), "Step 2", &RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(output.value["ok"], true);
        assert_eq!(client.call_times().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_tool_output_is_not_retried() {
        let client = Replay::new(vec![
            Err(LlmError::MissingToolOutput("plain text".into())),
            Ok(serde_json::json!({})),
        ]);

        let result = invoke_with_retry(&client, &request(), "Step 4", &RetryPolicy::default()).await;

        assert!(matches!(result, Err(GenError::SchemaViolation { .. })));
        assert_eq!(client.call_times().len(), 1);
    }
}
