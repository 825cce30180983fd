//! Per-run usage accounting

use crate::llm::TokenUsage;

/// Accumulates call counts and token usage across stages
///
/// Tokens are recorded only for stages that call the service directly
/// (seed, brainstorm, refinement). Group composition adds to the call count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageTracker {
    pub api_calls: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl UsageTracker {
    /// Record one direct call and its usage
    pub fn record(&mut self, usage: TokenUsage) {
        self.api_calls += 1;
        self.input_tokens += usage.input_tokens;
        self.output_tokens += usage.output_tokens;
    }

    /// Count calls whose tokens are not tracked
    pub fn add_calls(&mut self, count: u32) {
        self.api_calls += count;
    }
}
