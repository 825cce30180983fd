//! Final assembly: difficulty ordering and metadata packaging

use chrono::Utc;

use super::usage::UsageTracker;
use crate::types::{
    CategoryCandidate, GenerationMetadata, Group, Puzzle, PuzzleConfig, PuzzleGroup, RefinementReport, SeedResult,
};

/// Everything the run learned along the way, besides the groups themselves
#[derive(Debug, Clone)]
pub struct AssemblyContext<'a> {
    pub model: &'a str,
    pub config: &'a PuzzleConfig,
    pub seed: &'a SeedResult,
    pub candidates: &'a [CategoryCandidate],
    pub selected: &'a [CategoryCandidate],
    pub refinement: &'a RefinementReport,
    pub usage: UsageTracker,
}

/// Sort groups easiest first and package the puzzle
///
/// The sort is stable, so groups sharing a tier keep their build order.
pub fn assemble(mut groups: Vec<Group>, context: AssemblyContext<'_>) -> Puzzle {
    groups.sort_by_key(|g| g.difficulty_rank);

    let groups = groups
        .into_iter()
        .enumerate()
        .map(|(sort_order, g)| PuzzleGroup {
            category_name: g.category_name,
            words: g.words,
            difficulty_rank: g.difficulty_rank,
            sort_order,
        })
        .collect();

    Puzzle {
        groups,
        generation_metadata: GenerationMetadata {
            model: context.model.to_string(),
            seed_words: context.seed.seed_words.clone(),
            seed_story: context.seed.story.clone(),
            category_candidates: context.candidates.to_vec(),
            selected_categories: context.selected.to_vec(),
            red_herring_analysis: context.refinement.analysis.clone(),
            refinement: context.refinement.clone(),
            difficulty_profile: context.config.difficulty_profile,
            theme_hint: context.config.theme_hint.clone(),
            total_api_calls: context.usage.api_calls,
            total_input_tokens: context.usage.input_tokens,
            total_output_tokens: context.usage.output_tokens,
            generated_at: Utc::now(),
        },
    }
}
