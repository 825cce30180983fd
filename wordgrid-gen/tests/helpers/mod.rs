//! Test helper utilities
//!
//! Scripted generation client and JSON fixtures shared by integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use wordgrid_gen::llm::{LlmError, RetryPolicy, StructuredClient, StructuredOutput, StructuredRequest, TokenUsage};
use wordgrid_gen::schemas::{BRAINSTORM_TOOL, GROUP_TOOL, REFINEMENT_TOOL, SEED_TOOL};
use wordgrid_gen::PipelineEvent;

/// Usage reported for every scripted success
pub const CALL_INPUT_TOKENS: u64 = 100;
pub const CALL_OUTPUT_TOKENS: u64 = 40;

/// One recorded invocation
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub tool: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Client that replays per-tool queues of outcomes
///
/// An exhausted queue answers with a transient 500 error.
#[derive(Default)]
pub struct ScriptedClient {
    scripts: Mutex<HashMap<String, VecDeque<Result<Value, LlmError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, tool: &str, outcome: Result<Value, LlmError>) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(tool.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    pub fn push_ok(&self, tool: &str, value: Value) -> &Self {
        self.push(tool, Ok(value))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, tool: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.tool == tool).collect()
    }
}

#[async_trait]
impl StructuredClient for ScriptedClient {
    async fn invoke(&self, request: &StructuredRequest) -> Result<StructuredOutput, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            tool: request.tool.name.clone(),
            prompt: request.prompt.clone(),
            temperature: request.temperature,
        });

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&request.tool.name)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(LlmError::Api(500, "script exhausted".to_string())));

        next.map(|value| StructuredOutput {
            value,
            usage: TokenUsage {
                input_tokens: CALL_INPUT_TOKENS,
                output_tokens: CALL_OUTPUT_TOKENS,
            },
        })
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// Retry policy without sleeps
pub fn instant_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::ZERO,
    }
}

/// Collect every event currently buffered on the channel
pub fn drain_events(rx: &mut mpsc::Receiver<PipelineEvent>) -> Vec<PipelineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn seed_json() -> Value {
    json!({
        "seed_words": ["trumpet", "GLACIER", "Ledger", "SAFFRON"],
        "story": "A trumpeter kept a ledger of saffron prices while crossing a glacier."
    })
}

pub fn candidate(name: &str, category_type: &str, difficulty: &str) -> Value {
    json!({
        "category_name": name,
        "category_type": category_type,
        "difficulty": difficulty,
        "red_herring_potential": "overlaps with another theme"
    })
}

pub fn brainstorm_json(candidates: Vec<Value>, selected: &[i64]) -> Value {
    json!({
        "candidates": candidates,
        "selected_indices": selected,
        "selection_reasoning": "spread of types and tiers"
    })
}

/// Six candidates with four distinct types and tiers; select the first four
pub fn standard_brainstorm() -> Value {
    brainstorm_json(
        vec![
            candidate("Freshwater fish", "members_of_set", "yellow"),
            candidate("___ BOARD", "fill_in_the_blank", "green"),
            candidate("Words meaning NONSENSE", "synonyms", "blue"),
            candidate("Hidden body parts", "wordplay", "purple"),
            candidate("Bond villains", "cultural_knowledge", "blue"),
            candidate("FIRE ___", "compound_words", "green"),
        ],
        &[0, 1, 2, 3],
    )
}

pub fn group_json(name: &str, words: &[&str], pool: &[&str]) -> Value {
    json!({
        "category_name": name,
        "design_notes": "RULE: stated. VERIFICATION: every word checked.",
        "words": words,
        "candidate_words": pool,
    })
}

/// Four disjoint groups matching [`standard_brainstorm`], in build order
pub fn standard_groups() -> Vec<Value> {
    vec![
        group_json(
            "Freshwater fish",
            &["pike", "perch", "carp", "bream"],
            &["pike", "perch", "carp", "bream", "roach", "tench", "chub", "dace"],
        ),
        group_json(
            "___ BOARD",
            &["CHESS", "SKATE", "CLIP", "DART"],
            &["CHESS", "SKATE", "CLIP", "DART", "SURF", "KEY", "BILL", "SNOW"],
        ),
        group_json(
            "Words meaning NONSENSE",
            &["BUNK", "TRIPE", "HOGWASH", "DRIVEL"],
            &["BUNK", "TRIPE", "HOGWASH", "DRIVEL", "BALONEY", "TWADDLE", "GUFF", "ROT"],
        ),
        group_json(
            "Hidden body parts",
            &["SHIPMENT", "CHARMING", "SLEGGED", "THEARTH"],
            &["SHIPMENT", "CHARMING", "SLEGGED", "THEARTH", "SCHINA", "CHEEKY", "ANKLET", "BACKHAND"],
        ),
    ]
}

pub fn swap_json(group_index: i64, old_word: &str, new_word: &str) -> Value {
    json!({
        "group_index": group_index,
        "old_word": old_word,
        "new_word": new_word,
        "reason": "stronger misdirection"
    })
}

pub fn refinement_json(swaps: Vec<Value>) -> Value {
    json!({
        "existing_red_herrings": [{
            "word": "SKATE",
            "actual_group": "___ BOARD",
            "confused_with_group": "Freshwater fish",
            "strength": "strong"
        }],
        "suggested_swaps": swaps,
        "flagged_obscure": ["SLEGGED"],
        "analysis": "SKATE pulls players toward the fish group."
    })
}

/// Client scripted for a clean four-group run with the given refinement swaps
pub fn happy_path_client(swaps: Vec<Value>) -> Arc<ScriptedClient> {
    let client = ScriptedClient::new();
    client.push_ok(SEED_TOOL, seed_json());
    client.push_ok(BRAINSTORM_TOOL, standard_brainstorm());
    for group in standard_groups() {
        client.push_ok(GROUP_TOOL, group);
    }
    client.push_ok(REFINEMENT_TOOL, refinement_json(swaps));
    Arc::new(client)
}
