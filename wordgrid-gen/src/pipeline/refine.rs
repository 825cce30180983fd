//! Red-herring refinement
//!
//! Builds the review prompt for the assembled groups and applies the swaps the
//! service suggests, under hard membership and collision rules.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::ledger::{canonical, WordLedger};
use crate::types::{AppliedSwap, Group, SuggestedSwap};

/// Only this many suggested swaps are considered
pub const MAX_SWAPS: usize = 3;

/// Analysis text recorded when the refinement call fails
pub const REFINEMENT_SKIPPED: &str = "Refinement step skipped due to API failure.";

/// Build the refinement prompt listing every group with its candidate pool
pub fn build_refinement_prompt(groups: &[Group]) -> String {
    let mut description = String::new();
    for (i, group) in groups.iter().enumerate() {
        let _ = writeln!(
            description,
            "  Group {} [{}] {}\n    Words:      {}\n    Candidates: {}",
            i,
            group.difficulty.as_str().to_uppercase(),
            group.category_name,
            group.words.join(", "),
            group.candidate_pool.join(", ")
        );
    }

    format!(
        "You are reviewing a Connections puzzle for cross-group misdirection quality.\n\n\
         CURRENT PUZZLE:\n{description}\n\
         Your four tasks:\n\n\
         1. IDENTIFY existing red herrings: words in one group that a player might \
         plausibly assign to a different group. Rate each as weak/moderate/strong.\n\n\
         2. SUGGEST up to {MAX_SWAPS} word swaps that would increase misdirection. \
         IMPORTANT: new_word MUST appear in that group's 'Candidates' list above. \
         Do not invent words that aren't in the candidates; the swap will be rejected.\n\n\
         3. FLAG words that feel too obscure or ambiguous for the intended difficulty tier.\n\n\
         4. SUMMARIZE the overall cross-group misdirection in the analysis field.\n\n\
         Call the submit_refinement tool now."
    )
}

/// Why a suggested swap was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapRejection {
    InvalidGroupIndex,
    NotInCandidatePool,
    AlreadyInUse,
    OldWordNotInGroup,
}

impl SwapRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapRejection::InvalidGroupIndex => "invalid group index",
            SwapRejection::NotInCandidatePool => "new word not in candidate pool",
            SwapRejection::AlreadyInUse => "new word already used in the puzzle",
            SwapRejection::OldWordNotInGroup => "old word not in group",
        }
    }
}

/// Outcome of one suggested swap
#[derive(Debug, Clone, PartialEq)]
pub enum SwapDecision {
    Applied(AppliedSwap),
    Rejected {
        swap: SuggestedSwap,
        reason: SwapRejection,
    },
}

fn check_swap(groups: &[Group], ledger: &WordLedger, swap: &SuggestedSwap) -> Result<AppliedSwap, SwapRejection> {
    let group_index = usize::try_from(swap.group_index)
        .ok()
        .filter(|&i| i < groups.len())
        .ok_or(SwapRejection::InvalidGroupIndex)?;
    let group = &groups[group_index];

    let old_word = canonical(&swap.old_word);
    let new_word = canonical(&swap.new_word);

    if !group.candidate_pool.iter().any(|w| canonical(w) == new_word) {
        return Err(SwapRejection::NotInCandidatePool);
    }
    if new_word != old_word && ledger.contains(&new_word) {
        return Err(SwapRejection::AlreadyInUse);
    }
    if !group.words.contains(&old_word) {
        return Err(SwapRejection::OldWordNotInGroup);
    }

    Ok(AppliedSwap {
        group_index,
        old_word,
        new_word,
    })
}

/// Apply the first [`MAX_SWAPS`] suggestions in order
///
/// Each accepted swap updates both the group and the ledger before the next
/// one is checked. Rejected swaps leave everything untouched.
pub fn apply_swaps(groups: &mut [Group], ledger: &mut WordLedger, swaps: &[SuggestedSwap]) -> Vec<SwapDecision> {
    let mut decisions = Vec::new();

    for swap in swaps.iter().take(MAX_SWAPS) {
        match check_swap(groups, ledger, swap) {
            Ok(applied) => {
                let group = &mut groups[applied.group_index];
                if let Some(slot) = group.words.iter_mut().find(|w| **w == applied.old_word) {
                    *slot = applied.new_word.clone();
                }
                ledger.replace(&applied.old_word, &applied.new_word);
                tracing::info!(
                    group = applied.group_index,
                    category = %group.category_name,
                    old_word = %applied.old_word,
                    new_word = %applied.new_word,
                    "Applied refinement swap"
                );
                decisions.push(SwapDecision::Applied(applied));
            }
            Err(reason) => {
                tracing::info!(
                    group = swap.group_index,
                    old_word = %swap.old_word,
                    new_word = %swap.new_word,
                    reason = reason.as_str(),
                    "Rejected refinement swap"
                );
                decisions.push(SwapDecision::Rejected {
                    swap: swap.clone(),
                    reason,
                });
            }
        }
    }

    decisions
}
