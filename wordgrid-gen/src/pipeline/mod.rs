//! Puzzle generation pipeline
//!
//! Five sequential stages:
//! 1. **Seed** - four domain-spanning seed words and a story
//! 2. **Brainstorm** - 6-8 candidate categories, repaired selection
//! 3. **Build** - one composed group per selected category, deduplicated
//! 4. **Refine** - red-herring analysis and validated swaps (best-effort)
//! 5. **Assemble** - difficulty ordering and metadata
//!
//! Progress is reported through an optional [`PipelineEvent`] channel.

pub mod assemble;
pub mod difficulty;
pub mod ledger;
pub mod orchestrator;
pub mod refine;
pub mod selection;
pub mod usage;

pub use orchestrator::{PuzzleGenerator, RunState};
pub use usage::UsageTracker;

use serde::{Deserialize, Serialize};
use std::fmt;

use refine::SwapRejection;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Seed,
    Brainstorm,
    BuildGroups,
    Refinement,
    Assembly,
}

impl Stage {
    /// Label used in logs and error messages
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Seed => "Step 1",
            Stage::Brainstorm => "Step 2",
            Stage::BuildGroups => "Step 3",
            Stage::Refinement => "Step 4",
            Stage::Assembly => "Step 5",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Generation progress events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// A stage began
    StageStarted { stage: Stage },

    /// A stage finished successfully
    StageCompleted { stage: Stage },

    /// Brainstormed categories chosen for building, in build order
    CategoriesSelected { category_names: Vec<String> },

    /// A group was accepted and its words committed
    GroupBuilt {
        /// 0-based build position
        group_index: usize,
        category_name: String,
        words: Vec<String>,
    },

    /// One build attempt for a group failed
    GroupAttemptFailed {
        group_index: usize,
        attempt: u32,
        reason: String,
    },

    SwapApplied {
        group_index: usize,
        old_word: String,
        new_word: String,
    },

    SwapRejected {
        group_index: i64,
        old_word: String,
        new_word: String,
        reason: SwapRejection,
    },

    /// Refinement failed; groups passed through unchanged
    RefinementSkipped { reason: String },

    /// Puzzle assembled
    PipelineCompleted {
        total_api_calls: u32,
        total_input_tokens: u64,
        total_output_tokens: u64,
    },

    /// Run aborted
    PipelineFailed { stage: Stage, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = PipelineEvent::GroupAttemptFailed {
            group_index: 2,
            attempt: 1,
            reason: "too few words".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "GroupAttemptFailed");
        assert_eq!(json["group_index"], 2);

        let stage = serde_json::to_value(PipelineEvent::StageStarted { stage: Stage::BuildGroups }).unwrap();
        assert_eq!(stage["stage"], "build_groups");
    }
}
