//! Cross-group word deduplication
//!
//! [`WordLedger`] holds every canonical (uppercase) word already committed to
//! a group in this run. [`select_words`] is a pure function of the ledger and
//! one composed group; the caller commits its result only once the group is
//! accepted, so a failed attempt never leaves reservations behind.

use std::collections::HashSet;

use crate::error::{GenError, GenResult};
use crate::types::{ComposedGroup, CANDIDATE_POOL_SIZE};

/// Canonical form used for every comparison
pub fn canonical(word: &str) -> String {
    word.trim().to_uppercase()
}

/// Words committed to groups so far
#[derive(Debug, Clone, Default)]
pub struct WordLedger {
    words: HashSet<String>,
}

impl WordLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&canonical(word))
    }

    /// Record accepted words
    pub fn commit<S: AsRef<str>>(&mut self, words: &[S]) {
        self.words.extend(words.iter().map(|w| canonical(w.as_ref())));
    }

    /// Swap one committed word for another
    pub fn replace(&mut self, old_word: &str, new_word: &str) {
        self.words.remove(&canonical(old_word));
        self.words.insert(canonical(new_word));
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Words chosen for a group plus its normalized candidate pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSelection {
    /// Exactly `words_per_group` canonical words, none in the ledger
    pub words: Vec<String>,
    /// Exactly [`CANDIDATE_POOL_SIZE`] distinct canonical words, `words` first
    pub pool: Vec<String>,
}

/// Choose a group's final words against the ledger
///
/// Primary words are kept in order unless already committed or repeated;
/// gaps are backfilled from the ledger-filtered candidate pool.
pub fn select_words(
    ledger: &WordLedger,
    composed: &ComposedGroup,
    words_per_group: usize,
) -> GenResult<WordSelection> {
    let mut chosen: Vec<String> = Vec::with_capacity(words_per_group);

    for word in composed.words.iter().map(|w| canonical(w)) {
        if chosen.len() >= words_per_group {
            break;
        }
        if word.is_empty() || chosen.contains(&word) {
            continue;
        }
        if ledger.contains(&word) {
            tracing::warn!(word = %word, category = %composed.category_name, "Duplicate word; backfilling from candidate pool");
            continue;
        }
        chosen.push(word);
    }

    for word in composed.candidate_words.iter().map(|w| canonical(w)) {
        if chosen.len() >= words_per_group {
            break;
        }
        if !word.is_empty() && !chosen.contains(&word) && !ledger.contains(&word) {
            chosen.push(word);
        }
    }

    if chosen.len() < words_per_group {
        return Err(GenError::InsufficientContent {
            category: composed.category_name.clone(),
            got: chosen.len(),
            needed: words_per_group,
        });
    }

    let mut pool = chosen.clone();
    for word in composed.candidate_words.iter().map(|w| canonical(w)) {
        if pool.len() >= CANDIDATE_POOL_SIZE {
            break;
        }
        if !word.is_empty() && !pool.contains(&word) {
            pool.push(word);
        }
    }

    if pool.len() < CANDIDATE_POOL_SIZE {
        return Err(GenError::InsufficientContent {
            category: format!("{} (candidate pool)", composed.category_name),
            got: pool.len(),
            needed: CANDIDATE_POOL_SIZE,
        });
    }

    Ok(WordSelection { words: chosen, pool })
}
