//! Difficulty sequencing per profile and group count

use crate::types::{Difficulty, DifficultyProfile};
use crate::types::Difficulty::{Blue, Green, Purple, Yellow};

/// Four-group base sequence for a profile
pub fn base_profile(profile: DifficultyProfile) -> [Difficulty; 4] {
    match profile {
        DifficultyProfile::Easy => [Yellow, Yellow, Green, Blue],
        DifficultyProfile::Standard => [Yellow, Green, Blue, Purple],
        DifficultyProfile::Hard => [Green, Blue, Purple, Purple],
    }
}

/// Ordered difficulty tiers for `num_groups` groups
///
/// Fewer than four groups sample the base evenly (`base[floor(i * 4 / n)]`).
/// More than four extend it by cycling the level order, then stable-sort by rank.
pub fn difficulty_sequence(profile: DifficultyProfile, num_groups: usize) -> Vec<Difficulty> {
    let base = base_profile(profile);

    match num_groups {
        0 => Vec::new(),
        n if n < 4 => (0..n).map(|i| base[i * 4 / n]).collect(),
        4 => base.to_vec(),
        n => {
            let mut sequence = base.to_vec();
            sequence.extend((0..n - 4).map(|i| Difficulty::LEVEL_ORDER[i % 4]));
            sequence.sort_by_key(|d| d.rank());
            sequence
        }
    }
}
