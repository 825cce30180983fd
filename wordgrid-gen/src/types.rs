//! Core puzzle types
//!
//! Closed enumerations (category types, difficulty tiers, profiles) plus the
//! entities that flow between pipeline stages.

use crate::error::GenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of candidate words generated alongside every group
pub const CANDIDATE_POOL_SIZE: usize = 8;

/// Default number of groups in a puzzle
pub const DEFAULT_NUM_GROUPS: usize = 4;

/// Default number of words in each group
pub const DEFAULT_WORDS_PER_GROUP: usize = 4;

// ============================================================================
// Enumerations
// ============================================================================

/// Cognitive style of a group's connecting rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    /// Words that share a meaning
    Synonyms,
    /// Items belonging to a specific named set
    MembersOfSet,
    /// Words completing a phrase with a shared hidden word
    FillInTheBlank,
    /// Anagrams, homophones, hidden words, letter patterns
    Wordplay,
    /// Words pairing with a shared word to form a compound
    CompoundWords,
    /// Pop culture, history or domain expertise
    CulturalKnowledge,
}

impl CategoryType {
    pub const ALL: [CategoryType; 6] = [
        CategoryType::Synonyms,
        CategoryType::MembersOfSet,
        CategoryType::FillInTheBlank,
        CategoryType::Wordplay,
        CategoryType::CompoundWords,
        CategoryType::CulturalKnowledge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Synonyms => "synonyms",
            CategoryType::MembersOfSet => "members_of_set",
            CategoryType::FillInTheBlank => "fill_in_the_blank",
            CategoryType::Wordplay => "wordplay",
            CategoryType::CompoundWords => "compound_words",
            CategoryType::CulturalKnowledge => "cultural_knowledge",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                GenError::Config(format!(
                    "category_type must be one of {:?}, got '{}'",
                    CategoryType::ALL.map(|t| t.as_str()),
                    s
                ))
            })
    }
}

/// Difficulty tier, ordered easiest to hardest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Yellow,
    Green,
    Blue,
    Purple,
}

impl Difficulty {
    /// Canonical tier order, easiest first
    pub const LEVEL_ORDER: [Difficulty; 4] = [
        Difficulty::Yellow,
        Difficulty::Green,
        Difficulty::Blue,
        Difficulty::Purple,
    ];

    /// 1 (yellow) through 4 (purple)
    pub fn rank(&self) -> u8 {
        match self {
            Difficulty::Yellow => 1,
            Difficulty::Green => 2,
            Difficulty::Blue => 3,
            Difficulty::Purple => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Yellow => "yellow",
            Difficulty::Green => "green",
            Difficulty::Blue => "blue",
            Difficulty::Purple => "purple",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::LEVEL_ORDER
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| {
                GenError::Config(format!(
                    "difficulty must be one of {:?}, got '{}'",
                    Difficulty::LEVEL_ORDER.map(|d| d.as_str()),
                    s
                ))
            })
    }
}

/// Named difficulty profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyProfile {
    Easy,
    #[default]
    Standard,
    Hard,
}

impl DifficultyProfile {
    pub const ALL: [DifficultyProfile; 3] = [
        DifficultyProfile::Easy,
        DifficultyProfile::Standard,
        DifficultyProfile::Hard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyProfile::Easy => "easy",
            DifficultyProfile::Standard => "standard",
            DifficultyProfile::Hard => "hard",
        }
    }
}

impl fmt::Display for DifficultyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyProfile {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DifficultyProfile::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                GenError::Config(format!(
                    "Invalid difficulty_profile '{}'. Must be one of {:?}.",
                    s,
                    DifficultyProfile::ALL.map(|p| p.as_str())
                ))
            })
    }
}

// ============================================================================
// Pipeline configuration
// ============================================================================

/// Shape of the puzzle to generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    pub num_groups: usize,
    pub words_per_group: usize,
    pub difficulty_profile: DifficultyProfile,
    /// Free-text theme, woven into at most half of the brainstormed categories
    pub theme_hint: Option<String>,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            num_groups: DEFAULT_NUM_GROUPS,
            words_per_group: DEFAULT_WORDS_PER_GROUP,
            difficulty_profile: DifficultyProfile::default(),
            theme_hint: None,
        }
    }
}

impl PuzzleConfig {
    /// Reject shapes the pipeline cannot satisfy before any service call
    pub fn validate(&self) -> Result<(), GenError> {
        if self.num_groups == 0 {
            return Err(GenError::Config("num_groups must be at least 1".to_string()));
        }
        if self.words_per_group == 0 || self.words_per_group > CANDIDATE_POOL_SIZE {
            return Err(GenError::Config(format!(
                "words_per_group must be between 1 and {}, got {}",
                CANDIDATE_POOL_SIZE, self.words_per_group
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Stage entities
// ============================================================================

/// Stage 1 output: domain-spanning seed words and a story joining them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedResult {
    pub seed_words: Vec<String>,
    pub story: String,
}

/// One brainstormed category theme from Stage 2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCandidate {
    pub category_name: String,
    pub category_type: CategoryType,
    pub difficulty: Difficulty,
    pub red_herring_potential: String,
}

/// Stage 2 structured output
#[derive(Debug, Clone, Deserialize)]
pub struct BrainstormResult {
    pub candidates: Vec<CategoryCandidate>,
    pub selected_indices: Vec<i64>,
    #[serde(default)]
    pub selection_reasoning: String,
}

/// Structured output of a single group composition call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedGroup {
    pub category_name: String,
    #[serde(default)]
    pub design_notes: String,
    pub words: Vec<String>,
    pub candidate_words: Vec<String>,
}

/// A finalized group built in Stage 3
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub category_name: String,
    pub words: Vec<String>,
    /// Full uppercase candidate pool, kept for refinement swaps
    pub candidate_pool: Vec<String>,
    pub design_notes: String,
    pub difficulty: Difficulty,
    pub difficulty_rank: u8,
}

/// A group as it appears in the final artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleGroup {
    pub category_name: String,
    pub words: Vec<String>,
    pub difficulty_rank: u8,
    pub sort_order: usize,
}

/// Strength rating of a red herring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HerringStrength {
    Weak,
    Moderate,
    Strong,
}

/// A cross-group red herring identified during refinement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedHerring {
    pub word: String,
    pub actual_group: String,
    pub confused_with_group: String,
    pub strength: HerringStrength,
}

/// A swap suggested by the refinement call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedSwap {
    pub group_index: i64,
    pub old_word: String,
    pub new_word: String,
    #[serde(default)]
    pub reason: String,
}

/// Stage 4 structured output
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefinementResult {
    #[serde(default)]
    pub existing_red_herrings: Vec<RedHerring>,
    #[serde(default)]
    pub suggested_swaps: Vec<SuggestedSwap>,
    #[serde(default)]
    pub flagged_obscure: Vec<String>,
    #[serde(default)]
    pub analysis: String,
}

/// A swap that passed validation and was applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedSwap {
    pub group_index: usize,
    pub old_word: String,
    pub new_word: String,
}

/// What Stage 4 did, carried into the metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefinementReport {
    pub analysis: String,
    pub red_herrings: Vec<RedHerring>,
    pub applied_swaps: Vec<AppliedSwap>,
    pub flagged_obscure: Vec<String>,
    /// False when the refinement call failed and groups passed through
    pub performed: bool,
}

/// Generation metadata attached to the final artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub model: String,
    pub seed_words: Vec<String>,
    pub seed_story: String,
    pub category_candidates: Vec<CategoryCandidate>,
    pub selected_categories: Vec<CategoryCandidate>,
    pub red_herring_analysis: String,
    pub refinement: RefinementReport,
    pub difficulty_profile: DifficultyProfile,
    pub theme_hint: Option<String>,
    pub total_api_calls: u32,
    /// Stages 1, 2 and 4 only
    pub total_input_tokens: u64,
    /// Stages 1, 2 and 4 only
    pub total_output_tokens: u64,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Terminal artifact of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    pub groups: Vec<PuzzleGroup>,
    pub generation_metadata: GenerationMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_rank_order() {
        let ranks: Vec<u8> = Difficulty::LEVEL_ORDER.iter().map(|d| d.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert!(Difficulty::Yellow < Difficulty::Purple);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("fill_in_the_blank".parse::<CategoryType>().unwrap(), CategoryType::FillInTheBlank);
        assert_eq!("blue".parse::<Difficulty>().unwrap(), Difficulty::Blue);
        assert_eq!("hard".parse::<DifficultyProfile>().unwrap(), DifficultyProfile::Hard);
    }

    #[test]
    fn test_unknown_names_are_config_errors() {
        assert!(matches!("orange".parse::<Difficulty>(), Err(GenError::Config(_))));
        assert!(matches!("riddles".parse::<CategoryType>(), Err(GenError::Config(_))));
        assert!(matches!("brutal".parse::<DifficultyProfile>(), Err(GenError::Config(_))));
    }

    #[test]
    fn test_serde_names_match_display() {
        for t in CategoryType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t));
        }
        let json = serde_json::to_string(&Difficulty::Purple).unwrap();
        assert_eq!(json, "\"purple\"");
    }

    #[test]
    fn test_config_validation() {
        assert!(PuzzleConfig::default().validate().is_ok());

        let zero_groups = PuzzleConfig { num_groups: 0, ..Default::default() };
        assert!(matches!(zero_groups.validate(), Err(GenError::Config(_))));

        let too_many_words = PuzzleConfig { words_per_group: 9, ..Default::default() };
        assert!(matches!(too_many_words.validate(), Err(GenError::Config(_))));
    }

    #[test]
    fn test_brainstorm_deserializes_from_schema_shape() {
        let value = serde_json::json!({
            "candidates": [{
                "category_name": "___ CARD",
                "category_type": "fill_in_the_blank",
                "difficulty": "green",
                "red_herring_potential": "WILD overlaps with animals"
            }],
            "selected_indices": [0],
            "selection_reasoning": "only one"
        });
        let result: BrainstormResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.candidates[0].category_type, CategoryType::FillInTheBlank);
        assert_eq!(result.selected_indices, vec![0]);
    }
}
