//! Repair of the brainstormed category selection
//!
//! The brainstorm call proposes indices into its own candidate list. Nothing
//! guarantees those indices are valid or that the chosen categories make a
//! playable grid, so four passes run in order:
//!
//! 1. index sanitation (drop invalid/repeated, pad, truncate)
//! 2. type diversity when two or more groups are requested
//! 3. distinct difficulty tiers when at most four groups are requested
//! 4. no shared connector word between fill-in-the-blank categories
//!
//! Every pass is lenient: when no replacement exists the violation is logged
//! and left in place. Selection is tracked as candidate indices so "unselected"
//! stays accurate after each swap.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::types::{CategoryCandidate, CategoryType, Difficulty};

const CONNECTOR_STOP_WORDS: [&str; 17] = [
    "WORDS", "THAT", "EACH", "WITH", "BEFORE", "AFTER", "BLANK", "FILL", "TYPE", "TYPES", "THINGS",
    "PRECEDED", "FOLLOWED", "CONTAINS", "COMPOUND", "PHRASES", "PHRASE",
];

const MIN_CONNECTOR_LEN: usize = 4;

/// Candidate tokens that may name a fill-in-the-blank connector
pub fn connector_tokens(category_name: &str) -> BTreeSet<String> {
    category_name
        .split_whitespace()
        .map(|w| w.trim_matches(|c| matches!(c, '_' | '\'' | '"' | ',' | '.')).to_uppercase())
        .filter(|w| w.chars().count() >= MIN_CONNECTOR_LEN)
        .filter(|w| !CONNECTOR_STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Repair `requested` into exactly `num_groups` candidate indices
///
/// Callers must ensure `candidates.len() >= num_groups`; with fewer candidates
/// the result is as long as the candidate list.
pub fn repair_selection(
    candidates: &[CategoryCandidate],
    requested: &[i64],
    num_groups: usize,
    target: &[Difficulty],
) -> Vec<usize> {
    let mut selected = sanitize_indices(candidates.len(), requested, num_groups);

    if num_groups >= 2 {
        ensure_type_diversity(candidates, &mut selected);
    }
    ensure_distinct_tiers(candidates, &mut selected, target);
    resolve_connector_collisions(candidates, &mut selected);

    let names: Vec<&str> = selected.iter().map(|&i| candidates[i].category_name.as_str()).collect();
    tracing::info!(selected = ?names, "Category selection finalized");
    selected
}

fn is_unselected(selected: &[usize], index: usize) -> bool {
    !selected.contains(&index)
}

fn sanitize_indices(len: usize, requested: &[i64], num_groups: usize) -> Vec<usize> {
    let mut selected: Vec<usize> = Vec::with_capacity(num_groups);
    for &raw in requested {
        match usize::try_from(raw) {
            Ok(i) if i < len && !selected.contains(&i) => selected.push(i),
            _ => tracing::warn!(index = raw, candidates = len, "Dropping invalid or repeated selection index"),
        }
    }

    if selected.len() < num_groups {
        tracing::warn!(
            valid = selected.len(),
            needed = num_groups,
            "Padding selection with first available candidates"
        );
        for i in 0..len {
            if selected.len() >= num_groups {
                break;
            }
            if is_unselected(&selected, i) {
                selected.push(i);
            }
        }
    }

    selected.truncate(num_groups);
    selected
}

fn distinct_types(candidates: &[CategoryCandidate], selected: &[usize]) -> usize {
    selected
        .iter()
        .map(|&i| candidates[i].category_type)
        .collect::<HashSet<_>>()
        .len()
}

fn ensure_type_diversity(candidates: &[CategoryCandidate], selected: &mut [usize]) {
    let Some((&last_slot, _)) = selected.split_last() else {
        return;
    };
    if selected.len() < 2 || distinct_types(candidates, selected) >= 2 {
        return;
    }

    let only_type = candidates[last_slot].category_type;
    tracing::warn!(category_type = %only_type, "Selection contains a single category type");

    let replacement = (0..candidates.len())
        .find(|&i| is_unselected(selected, i) && candidates[i].category_type != only_type);

    match replacement {
        Some(i) => {
            tracing::info!(
                replaced = %candidates[last_slot].category_name,
                with = %candidates[i].category_name,
                category_type = %candidates[i].category_type,
                "Swapped last selection for type diversity"
            );
            let last = selected.len() - 1;
            selected[last] = i;
        }
        None => tracing::warn!("No candidate of a different type available; keeping selection"),
    }
}

fn ensure_distinct_tiers(candidates: &[CategoryCandidate], selected: &mut [usize], target: &[Difficulty]) {
    for pos in 0..selected.len() {
        let tier = candidates[selected[pos]].difficulty;
        let seen_before = selected[..pos].iter().any(|&i| candidates[i].difficulty == tier);
        if !seen_before {
            continue;
        }

        tracing::warn!(difficulty = %tier, position = pos, "Duplicate difficulty tier in selection");

        let used_tiers: HashSet<Difficulty> = selected.iter().map(|&i| candidates[i].difficulty).collect();
        let keeps_diversity = |i: usize| {
            let mut trial = selected.to_vec();
            trial[pos] = i;
            trial.len() < 2 || distinct_types(candidates, &trial) >= 2
        };

        let replacement = (0..candidates.len())
            .filter(|&i| is_unselected(selected, i) && !used_tiers.contains(&candidates[i].difficulty))
            .min_by_key(|&i| {
                (
                    !target.contains(&candidates[i].difficulty),
                    !keeps_diversity(i),
                    i,
                )
            });

        match replacement {
            Some(i) => {
                tracing::info!(
                    replaced = %candidates[selected[pos]].category_name,
                    with = %candidates[i].category_name,
                    difficulty = %candidates[i].difficulty,
                    "Replaced duplicate difficulty tier"
                );
                selected[pos] = i;
            }
            None => tracing::warn!(difficulty = %tier, "No candidate with an unused tier; keeping duplicate"),
        }
    }
}

/// Selection positions of fill-in-the-blank entries that share a connector token
fn colliding_positions(candidates: &[CategoryCandidate], selected: &[usize]) -> BTreeSet<usize> {
    let mut by_token: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (pos, &i) in selected.iter().enumerate() {
        if candidates[i].category_type != CategoryType::FillInTheBlank {
            continue;
        }
        for token in connector_tokens(&candidates[i].category_name) {
            by_token.entry(token).or_default().push(pos);
        }
    }

    by_token
        .into_iter()
        .filter(|(_, positions)| positions.len() >= 2)
        .flat_map(|(token, positions)| {
            tracing::warn!(connector = %token, "Fill-in-the-blank categories share a connector word");
            positions
        })
        .collect()
}

fn resolve_connector_collisions(candidates: &[CategoryCandidate], selected: &mut [usize]) {
    // Each replacement removes every collision involving the replaced slot
    for _ in 0..=candidates.len() {
        let colliding = colliding_positions(candidates, selected);
        let Some(&pos) = colliding.iter().next_back() else {
            return;
        };

        let other_tokens: BTreeSet<String> = selected
            .iter()
            .enumerate()
            .filter(|&(p, &i)| p != pos && candidates[i].category_type == CategoryType::FillInTheBlank)
            .flat_map(|(_, &i)| connector_tokens(&candidates[i].category_name))
            .collect();

        let current: &[usize] = selected;
        let unselected = move || (0..candidates.len()).filter(move |&i| is_unselected(current, i));
        let replacement = unselected()
            .find(|&i| candidates[i].category_type != CategoryType::FillInTheBlank)
            .or_else(|| {
                unselected().find(|&i| {
                    connector_tokens(&candidates[i].category_name)
                        .is_disjoint(&other_tokens)
                })
            });

        match replacement {
            Some(i) => {
                tracing::info!(
                    replaced = %candidates[selected[pos]].category_name,
                    with = %candidates[i].category_name,
                    category_type = %candidates[i].category_type,
                    "Replaced fill-in-the-blank category with shared connector"
                );
                selected[pos] = i;
            }
            None => {
                tracing::warn!("No replacement for colliding fill-in-the-blank category; keeping selection");
                return;
            }
        }
    }
}
