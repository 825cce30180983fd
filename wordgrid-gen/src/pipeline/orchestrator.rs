//! Pipeline orchestrator
//!
//! [`PuzzleGenerator`] sequences the five stages over one
//! [`StructuredClient`]. Each run owns a [`RunState`] (ledger, usage, built
//! groups), so a single generator can serve independent runs without locking.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::assemble::{assemble, AssemblyContext};
use super::difficulty::difficulty_sequence;
use super::ledger::{select_words, WordLedger};
use super::refine::{apply_swaps, build_refinement_prompt, SwapDecision, REFINEMENT_SKIPPED};
use super::selection::repair_selection;
use super::usage::UsageTracker;
use super::{PipelineEvent, Stage};
use crate::compose::{GroupComposer, GroupRequest};
use crate::config::DEFAULT_MAX_TOKENS;
use crate::error::{GenError, GenResult};
use crate::llm::{invoke_with_retry, RetryPolicy, StructuredClient, StructuredRequest, ToolSchema};
use crate::schemas;
use crate::types::{
    BrainstormResult, CategoryCandidate, CategoryType, Group, Puzzle, PuzzleConfig, RefinementReport,
    RefinementResult, SeedResult,
};

/// Group build attempts before the run is aborted
pub const MAX_GROUP_ATTEMPTS: u32 = 3;

const SEED_TEMPERATURE: f32 = 1.0;
const BRAINSTORM_TEMPERATURE: f32 = 0.9;
const REFINEMENT_TEMPERATURE: f32 = 0.7;

/// Mutable context threaded through the stages of one run
#[derive(Debug, Default)]
pub struct RunState {
    pub stage: Option<Stage>,
    pub usage: UsageTracker,
    pub ledger: WordLedger,
    /// Groups in build order
    pub groups: Vec<Group>,
}

/// Multi-stage puzzle generator
pub struct PuzzleGenerator {
    client: Arc<dyn StructuredClient>,
    composer: GroupComposer,
    retry: RetryPolicy,
    max_tokens: u32,
    event_tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl PuzzleGenerator {
    /// Create a generator over the given client
    pub fn new(client: Arc<dyn StructuredClient>) -> Self {
        Self {
            composer: GroupComposer::new(Arc::clone(&client)),
            client,
            retry: RetryPolicy::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
            event_tx: None,
        }
    }

    /// Report progress on `event_tx`
    pub fn with_events(mut self, event_tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Override the per-call retry schedule (all stages)
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.composer = self.composer.with_retry(retry);
        self.retry = retry;
        self
    }

    /// Override the token budget per call (all stages)
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.composer = self.composer.with_max_tokens(max_tokens);
        self.max_tokens = max_tokens;
        self
    }

    /// Generate a puzzle, logging the failure reason and returning `None` on error
    pub async fn generate_puzzle(&self, config: &PuzzleConfig) -> Option<Puzzle> {
        match self.run(config).await {
            Ok(puzzle) => Some(puzzle),
            Err(e) => {
                error!(error = %e, kind = e.kind(), "Puzzle generation failed");
                None
            }
        }
    }

    /// Generate a puzzle, returning the failure cause on error
    pub async fn run(&self, config: &PuzzleConfig) -> GenResult<Puzzle> {
        config.validate()?;

        info!(
            groups = config.num_groups,
            words_per_group = config.words_per_group,
            profile = %config.difficulty_profile,
            theme = config.theme_hint.as_deref().unwrap_or("none"),
            "Starting puzzle generation"
        );

        let mut state = RunState::default();
        match self.run_stages(config, &mut state).await {
            Ok(puzzle) => {
                info!(
                    groups = puzzle.groups.len(),
                    api_calls = state.usage.api_calls,
                    input_tokens = state.usage.input_tokens,
                    output_tokens = state.usage.output_tokens,
                    "Puzzle generation complete"
                );
                self.emit(PipelineEvent::PipelineCompleted {
                    total_api_calls: state.usage.api_calls,
                    total_input_tokens: state.usage.input_tokens,
                    total_output_tokens: state.usage.output_tokens,
                })
                .await;
                Ok(puzzle)
            }
            Err(e) => {
                let stage = state.stage.unwrap_or(Stage::Seed);
                error!(stage = %stage, error = %e, "Aborting pipeline");
                self.emit(PipelineEvent::PipelineFailed {
                    stage,
                    error: e.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    async fn run_stages(&self, config: &PuzzleConfig, state: &mut RunState) -> GenResult<Puzzle> {
        self.begin(state, Stage::Seed).await;
        let seed = self.seed(state, config).await?;
        self.finish(Stage::Seed).await;

        self.begin(state, Stage::Brainstorm).await;
        let (candidates, selected) = self.brainstorm(state, config, &seed).await?;
        self.finish(Stage::Brainstorm).await;

        self.begin(state, Stage::BuildGroups).await;
        self.build_groups(state, config, &selected).await?;
        self.finish(Stage::BuildGroups).await;

        self.begin(state, Stage::Refinement).await;
        let refinement = self.refine(state).await;
        self.finish(Stage::Refinement).await;

        self.begin(state, Stage::Assembly).await;
        let puzzle = assemble(
            std::mem::take(&mut state.groups),
            AssemblyContext {
                model: self.client.model_name(),
                config,
                seed: &seed,
                candidates: &candidates,
                selected: &selected,
                refinement: &refinement,
                usage: state.usage,
            },
        );
        self.finish(Stage::Assembly).await;

        Ok(puzzle)
    }

    // ------------------------------------------------------------------------
    // Stage 1
    // ------------------------------------------------------------------------

    async fn seed(&self, state: &mut RunState, config: &PuzzleConfig) -> GenResult<SeedResult> {
        let prompt = seed_prompt(config.theme_hint.as_deref());
        let mut seed: SeedResult = self
            .call_stage(state, Stage::Seed, prompt, schemas::seed_tool(), SEED_TEMPERATURE)
            .await?;

        for word in &mut seed.seed_words {
            *word = word.trim().to_uppercase();
        }

        info!(seeds = %seed.seed_words.join(", "), "Seed stage complete");
        debug!(story = %seed.story, "Seed story");
        Ok(seed)
    }

    // ------------------------------------------------------------------------
    // Stage 2
    // ------------------------------------------------------------------------

    async fn brainstorm(
        &self,
        state: &mut RunState,
        config: &PuzzleConfig,
        seed: &SeedResult,
    ) -> GenResult<(Vec<CategoryCandidate>, Vec<CategoryCandidate>)> {
        let target = difficulty_sequence(config.difficulty_profile, config.num_groups);
        info!(
            groups = config.num_groups,
            profile = %config.difficulty_profile,
            "Brainstorming categories"
        );

        let prompt = brainstorm_prompt(config, seed, &target);
        let result: BrainstormResult = self
            .call_stage(
                state,
                Stage::Brainstorm,
                prompt,
                schemas::brainstorm_tool(),
                BRAINSTORM_TEMPERATURE,
            )
            .await?;

        if result.candidates.len() < config.num_groups {
            return Err(GenError::NotEnoughCandidates {
                got: result.candidates.len(),
                needed: config.num_groups,
            });
        }
        debug!(reasoning = %result.selection_reasoning, "Brainstorm selection reasoning");

        let indices = repair_selection(&result.candidates, &result.selected_indices, config.num_groups, &target);
        let selected: Vec<CategoryCandidate> = indices.iter().map(|&i| result.candidates[i].clone()).collect();

        self.emit(PipelineEvent::CategoriesSelected {
            category_names: selected.iter().map(|c| c.category_name.clone()).collect(),
        })
        .await;

        Ok((result.candidates, selected))
    }

    // ------------------------------------------------------------------------
    // Stage 3
    // ------------------------------------------------------------------------

    async fn build_groups(
        &self,
        state: &mut RunState,
        config: &PuzzleConfig,
        selected: &[CategoryCandidate],
    ) -> GenResult<()> {
        info!(
            groups = selected.len(),
            words_per_group = config.words_per_group,
            "Building groups"
        );

        for (index, category) in selected.iter().enumerate() {
            let group = self.build_one_group(state, config, index, selected.len(), category).await?;
            state.ledger.commit(&group.words);

            info!(
                group = index + 1,
                total = selected.len(),
                category = %group.category_name,
                words = %group.words.join(", "),
                "Group complete"
            );
            self.emit(PipelineEvent::GroupBuilt {
                group_index: index,
                category_name: group.category_name.clone(),
                words: group.words.clone(),
            })
            .await;

            state.groups.push(group);
        }

        Ok(())
    }

    async fn build_one_group(
        &self,
        state: &mut RunState,
        config: &PuzzleConfig,
        index: usize,
        total: usize,
        category: &CategoryCandidate,
    ) -> GenResult<Group> {
        let mut last_error: Option<GenError> = None;

        for attempt in 1..=MAX_GROUP_ATTEMPTS {
            info!(
                group = index + 1,
                total,
                attempt,
                category = %category.category_name,
                category_type = %category.category_type,
                difficulty = %category.difficulty,
                "Composing group"
            );

            let request = GroupRequest {
                category_type: category.category_type,
                difficulty: category.difficulty,
                existing: &state.groups,
                words_per_group: config.words_per_group,
                hint: Some(category.category_name.as_str()),
            };

            let outcome = match self.composer.compose(&request).await {
                Ok(composed) => {
                    state.usage.add_calls(1);
                    select_words(&state.ledger, &composed, config.words_per_group).map(|selection| Group {
                        category_name: composed.category_name,
                        words: selection.words,
                        candidate_pool: selection.pool,
                        design_notes: composed.design_notes,
                        difficulty: category.difficulty,
                        difficulty_rank: category.difficulty.rank(),
                    })
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(group) => return Ok(group),
                Err(e) => {
                    warn!(
                        group = index + 1,
                        attempt,
                        max_attempts = MAX_GROUP_ATTEMPTS,
                        error = %e,
                        "Group attempt failed"
                    );
                    self.emit(PipelineEvent::GroupAttemptFailed {
                        group_index: index,
                        attempt,
                        reason: e.to_string(),
                    })
                    .await;
                    last_error = Some(e);
                }
            }
        }

        error!(
            group = index + 1,
            attempts = MAX_GROUP_ATTEMPTS,
            category = %category.category_name,
            "No usable group after all attempts"
        );
        Err(last_error.unwrap_or(GenError::InsufficientContent {
            category: category.category_name.clone(),
            got: 0,
            needed: config.words_per_group,
        }))
    }

    // ------------------------------------------------------------------------
    // Stage 4
    // ------------------------------------------------------------------------

    async fn refine(&self, state: &mut RunState) -> RefinementReport {
        let prompt = build_refinement_prompt(&state.groups);
        let result: GenResult<RefinementResult> = self
            .call_stage(
                state,
                Stage::Refinement,
                prompt,
                schemas::refinement_tool(),
                REFINEMENT_TEMPERATURE,
            )
            .await;

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Refinement failed; keeping groups unchanged");
                self.emit(PipelineEvent::RefinementSkipped { reason: e.to_string() }).await;
                return RefinementReport {
                    analysis: REFINEMENT_SKIPPED.to_string(),
                    performed: false,
                    ..Default::default()
                };
            }
        };

        let decisions = apply_swaps(&mut state.groups, &mut state.ledger, &result.suggested_swaps);
        let mut applied_swaps = Vec::new();
        for decision in decisions {
            match decision {
                SwapDecision::Applied(swap) => {
                    self.emit(PipelineEvent::SwapApplied {
                        group_index: swap.group_index,
                        old_word: swap.old_word.clone(),
                        new_word: swap.new_word.clone(),
                    })
                    .await;
                    applied_swaps.push(swap);
                }
                SwapDecision::Rejected { swap, reason } => {
                    self.emit(PipelineEvent::SwapRejected {
                        group_index: swap.group_index,
                        old_word: swap.old_word,
                        new_word: swap.new_word,
                        reason,
                    })
                    .await;
                }
            }
        }

        info!(swaps = applied_swaps.len(), "Refinement complete");
        RefinementReport {
            analysis: result.analysis,
            red_herrings: result.existing_red_herrings,
            applied_swaps,
            flagged_obscure: result.flagged_obscure,
            performed: true,
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// One direct stage call: retry, decode, then record usage
    ///
    /// A reply that fails to decode is not counted.
    async fn call_stage<T: DeserializeOwned>(
        &self,
        state: &mut RunState,
        stage: Stage,
        prompt: String,
        tool: ToolSchema,
        temperature: f32,
    ) -> GenResult<T> {
        let request = StructuredRequest {
            prompt,
            tool,
            temperature,
            max_tokens: self.max_tokens,
        };

        let output = invoke_with_retry(self.client.as_ref(), &request, stage.label(), &self.retry).await?;
        let value = output.decode(stage.label())?;
        state.usage.record(output.usage);
        Ok(value)
    }

    async fn begin(&self, state: &mut RunState, stage: Stage) {
        state.stage = Some(stage);
        info!(stage = %stage, "Stage started");
        self.emit(PipelineEvent::StageStarted { stage }).await;
    }

    async fn finish(&self, stage: Stage) {
        self.emit(PipelineEvent::StageCompleted { stage }).await;
    }

    /// Emit pipeline event if channel configured
    async fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }
}

// ============================================================================
// Stage prompts
// ============================================================================

fn seed_prompt(theme_hint: Option<&str>) -> String {
    let theme_clause = match theme_hint {
        Some(theme) => format!(
            "The puzzle has a theme hint of '{theme}'. Seed words may loosely relate to it, \
             but must still span different domains."
        ),
        None => "There is no theme constraint. Choose seeds from wildly different domains.".to_string(),
    };

    format!(
        "You are seeding the creative process for a Connections word puzzle.\n\n\
         Choose 4 seed words, each from a DIFFERENT domain (e.g. cooking, sport, technology, \
         history, nature, fashion, music, film, science, geography). The domains should be as \
         varied as possible so the final puzzle doesn't cluster around a single theme.\n\n\
         {theme_clause}\n\n\
         Then write a brief, creative 2-3 sentence story that naturally incorporates all 4 seed \
         words. The story's domain juxtaposition will guide category brainstorming in the next \
         step, so make it imaginative and specific.\n\n\
         Call the {tool} tool now.",
        tool = schemas::SEED_TOOL
    )
}

fn brainstorm_prompt(config: &PuzzleConfig, seed: &SeedResult, target: &[crate::types::Difficulty]) -> String {
    let sequence = target.iter().map(|d| d.as_str()).collect::<Vec<_>>().join(" -> ");
    let types = CategoryType::ALL.map(|t| t.as_str()).join(", ");
    let theme_clause = config
        .theme_hint
        .as_deref()
        .map(|theme| format!("\nTHEME HINT: '{theme}'. Weave this into at most half the categories."))
        .unwrap_or_default();
    let n = config.num_groups;

    format!(
        "You are designing a Connections word puzzle. A creative story was written to spark varied ideas:\n\n\
         SEED STORY: \"{story}\"\n\
         SEED WORDS: {seeds}\n\
         {theme_clause}\n\n\
         DIFFICULTY PROFILE: {profile}\n\
         TARGET DIFFICULTY SEQUENCE: {sequence} (easiest -> hardest)\n\
         GROUPS TO SELECT: {n}\n\n\
         Generate 6-8 candidate category themes. For each candidate specify:\n\
         \x20 - A specific, evocative category_name (not generic like 'Animals' or 'Colors')\n\
         \x20 - A category_type from: {types}\n\
         \x20 - A difficulty level: yellow (easy), green (moderate), blue (hard), purple (hardest)\n\
         \x20 - A red_herring_potential note: why this category could be confused with others\n\n\
         Then select the best {n} categories by index, ensuring:\n\
         \x20 1. At least 2 DIFFERENT category_types are represented\n\
         \x20 2. Difficulty levels approximately match the target sequence\n\
         \x20 3. Maximum cross-group misdirection potential between the selected categories\n\
         \x20 4. No two fill_in_the_blank categories share the same connector/blank word\n\n\
         HARD RULES (violating any of these disqualifies a candidate):\n\
         \x20 - SEED WORDS ARE INSPIRATION ONLY. Do NOT build a category whose primary subject IS a \
         seed word. Use the seed story's MOOD and JUXTAPOSITION, not its nouns, as creative fuel.\n\
         \x20 - AVOID these overused themes: days of week, seasons, months, primary colors, planets, \
         card suits, Monopoly board properties, chess pieces, playing card ranks, dice or board game \
         taxonomies, types of fruit, US states, '___ PARTY' fill-in-the-blank.\n\n\
         Call the {tool} tool now.",
        story = seed.story,
        seeds = seed.seed_words.join(", "),
        profile = config.difficulty_profile.as_str().to_uppercase(),
        tool = schemas::BRAINSTORM_TOOL,
    )
}
