//! Tool schemas that force the shape of each stage's output
//!
//! Property order matters for the group tool: the service tends to fill
//! fields in schema order, so `design_notes` precedes the word lists.

use serde_json::json;

use crate::llm::ToolSchema;
use crate::types::{CategoryType, Difficulty};

pub const SEED_TOOL: &str = "submit_seed";
pub const BRAINSTORM_TOOL: &str = "submit_categories";
pub const GROUP_TOOL: &str = "submit_word_group";
pub const REFINEMENT_TOOL: &str = "submit_refinement";

fn category_type_names() -> Vec<&'static str> {
    CategoryType::ALL.iter().map(|t| t.as_str()).collect()
}

fn difficulty_names() -> Vec<&'static str> {
    Difficulty::LEVEL_ORDER.iter().map(|d| d.as_str()).collect()
}

/// Stage 1: four seed words and a story
pub fn seed_tool() -> ToolSchema {
    ToolSchema {
        name: SEED_TOOL.to_string(),
        description: "Submit 4 seed words from different domains and a creative story.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "seed_words": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Exactly 4 UPPERCASE seed words, each from a different domain."
                },
                "story": {
                    "type": "string",
                    "description": "A creative 2-3 sentence story incorporating all 4 seed words naturally. \
                                    The story's domain juxtaposition should spark varied category ideas."
                }
            },
            "required": ["seed_words", "story"]
        }),
    }
}

/// Stage 2: 6-8 candidates plus the chosen indices
pub fn brainstorm_tool() -> ToolSchema {
    ToolSchema {
        name: BRAINSTORM_TOOL.to_string(),
        description: "Submit 6-8 candidate category themes and select the best subset.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "candidates": {
                    "type": "array",
                    "description": "Between 6 and 8 candidate category themes.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "category_name": {
                                "type": "string",
                                "description": "Specific, evocative label (not generic like 'Animals')."
                            },
                            "category_type": {"type": "string", "enum": category_type_names()},
                            "difficulty": {"type": "string", "enum": difficulty_names()},
                            "red_herring_potential": {
                                "type": "string",
                                "description": "Brief note on why this category could be confused with others."
                            }
                        },
                        "required": ["category_name", "category_type", "difficulty", "red_herring_potential"]
                    }
                },
                "selected_indices": {
                    "type": "array",
                    "items": {"type": "integer"},
                    "description": "0-based indices of the best categories from candidates[]. \
                                    Must satisfy: at least 2 different category_types, difficulty levels span the range."
                },
                "selection_reasoning": {
                    "type": "string",
                    "description": "Why this selection maximises puzzle quality and cross-group misdirection."
                }
            },
            "required": ["candidates", "selected_indices", "selection_reasoning"]
        }),
    }
}

/// Stage 3: one word group with its verification notes and candidate pool
pub fn group_tool() -> ToolSchema {
    ToolSchema {
        name: GROUP_TOOL.to_string(),
        description: "Submit the completed word group for this puzzle category. \
                      Call this tool ONCE with all four fields populated."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "category_name": {
                    "type": "string",
                    "description": "A specific, evocative category label, not a generic phrase like 'Animals' \
                                    or 'Colors'. The label's own words must NOT appear in the word list. \
                                    Example of good label: 'Preceded by WILD', not just 'WILD ___'."
                },
                "design_notes": {
                    "type": "string",
                    "description": "Fill this field FIRST, before words or candidate_words. \
                                    Structure it in three parts:\n\
                                    1. RULE: State the exact rule precisely.\n\
                                    2. VERIFICATION: For every word you plan to include, write \
                                    '[WORD]: [proof it satisfies the rule]'. Discard any word that fails.\n\
                                    3. RED HERRING: Name the red herring candidate, prove it passes the rule, \
                                    and explain which existing group it could be confused with."
                },
                "words": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Fill this AFTER design_notes. The final words_per_group words, only \
                                    words that passed verification in design_notes. All uppercase."
                },
                "candidate_words": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Fill this AFTER design_notes. Exactly 8 uppercase words, all of which \
                                    passed verification in design_notes. Must include all words in 'words'."
                }
            },
            "required": ["category_name", "words", "candidate_words", "design_notes"]
        }),
    }
}

/// Stage 4: red-herring analysis and swap suggestions
pub fn refinement_tool() -> ToolSchema {
    ToolSchema {
        name: REFINEMENT_TOOL.to_string(),
        description: "Submit cross-group red herring analysis and suggested word swaps.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "existing_red_herrings": {
                    "type": "array",
                    "description": "Cross-group red herrings already present in the puzzle.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "word": {"type": "string"},
                            "actual_group": {"type": "string"},
                            "confused_with_group": {"type": "string"},
                            "strength": {"type": "string", "enum": ["weak", "moderate", "strong"]}
                        },
                        "required": ["word", "actual_group", "confused_with_group", "strength"]
                    }
                },
                "suggested_swaps": {
                    "type": "array",
                    "description": "Up to 3 word swaps that increase cross-group misdirection.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "group_index": {"type": "integer", "description": "0-based index of the group to modify."},
                            "old_word": {"type": "string"},
                            "new_word": {"type": "string", "description": "Must appear in that group's candidate_words list."},
                            "reason": {"type": "string"}
                        },
                        "required": ["group_index", "old_word", "new_word", "reason"]
                    }
                },
                "flagged_obscure": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Words that feel too obscure or ambiguous for the puzzle."
                },
                "analysis": {"type": "string", "description": "Overall cross-group misdirection assessment."}
            },
            "required": ["existing_red_herrings", "suggested_swaps", "flagged_obscure", "analysis"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brainstorm_enums_cover_closed_sets() {
        let tool = brainstorm_tool();
        let item = &tool.input_schema["properties"]["candidates"]["items"]["properties"];
        assert_eq!(item["category_type"]["enum"].as_array().unwrap().len(), 6);
        assert_eq!(item["difficulty"]["enum"][3], "purple");
    }

    #[test]
    fn test_group_tool_requires_design_notes() {
        let tool = group_tool();
        let required = tool.input_schema["required"].as_array().unwrap();
        assert!(required.iter().any(|r| r == "design_notes"));
        assert_eq!(tool.name, GROUP_TOOL);
    }
}
