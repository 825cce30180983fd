//! Prompt construction for single-group composition

use crate::types::{CategoryType, Difficulty, Group, CANDIDATE_POOL_SIZE};

fn difficulty_description(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Yellow => {
            "YELLOW (easiest): the connection is obvious and relies only on common everyday \
             knowledge. Most players should recognise this group immediately."
        }
        Difficulty::Green => {
            "GREEN (moderate): the connection requires a moment of thought or slightly \
             less-common knowledge. Players may need to rule out other options first."
        }
        Difficulty::Blue => {
            "BLUE (hard): the connection is non-obvious and may rely on specialised, \
             cultural, or domain-specific knowledge. Expect many players to struggle here."
        }
        Difficulty::Purple => {
            "PURPLE (hardest): the connection depends on wordplay, lateral thinking, hidden \
             patterns, or a trick that makes players say 'aha!' only after the reveal."
        }
    }
}

fn category_type_description(category_type: CategoryType) -> &'static str {
    match category_type {
        CategoryType::Synonyms => {
            "SYNONYMS: words that share a single meaning or can replace each other in a sentence. \
             Example category: 'Words meaning EXHAUSTED' -> SPENT, DRAINED, BEAT, WASHED OUT."
        }
        CategoryType::MembersOfSet => {
            "MEMBERS OF A SET: items that all belong to a specific, named real-world category. \
             Example: 'Types of PASTA' -> RIGATONI, FARFALLE, ORZO, BUCATINI."
        }
        CategoryType::FillInTheBlank => {
            "FILL IN THE BLANK: each word completes the same common phrase when combined with a \
             shared hidden word. Example: '___ CARD' -> CREDIT, WILD, PLAYING, BUSINESS."
        }
        CategoryType::Wordplay => {
            "WORDPLAY: the connection is a structural or phonetic trick. You MUST choose a single, \
             precise, verifiable rule and confirm every word satisfies it before including it. \
             Good rule types (pick ONE):\n\
             \x20 - Hidden word: each word contains a smaller word inside it. Verify by finding the \
             hidden word in each entry letter-by-letter.\n\
             \x20 - Anagrams of each other: every word uses the exact same letters, e.g. LISTEN, \
             SILENT, ENLIST, TINSEL. Verify by sorting letters.\n\
             \x20 - Homophones of a category: each word sounds like a member of a set, e.g. 'Sounds \
             like a number': ATE, TOO, FOR, WON. Verify the sound match explicitly.\n\
             Do NOT include a word unless you can prove the rule applies to it."
        }
        CategoryType::CompoundWords => {
            "COMPOUND WORDS: each word pairs with the same hidden word to form a valid compound. \
             Example: 'FIRE ___' -> TRUCK, WORKS, FLY, PLACE."
        }
        CategoryType::CulturalKnowledge => {
            "CULTURAL KNOWLEDGE: the connection requires knowing pop culture, history, sport, \
             literature, or another domain. Example: 'Bowie alter egos' -> ZIGGY, ALADDIN, JARETH, MAJOR TOM."
        }
    }
}

/// Inputs to a single group prompt
#[derive(Debug, Clone, Copy)]
pub struct GroupRequest<'a> {
    pub category_type: CategoryType,
    pub difficulty: Difficulty,
    /// Groups already finalized in this run, in build order
    pub existing: &'a [Group],
    pub words_per_group: usize,
    /// Concept proposed by the brainstorm stage
    pub hint: Option<&'a str>,
}

/// Build the user message for one group composition call
pub fn build_group_prompt(request: &GroupRequest<'_>) -> String {
    let n = request.words_per_group;
    let mut lines: Vec<String> = vec![
        "You are designing one group for a Connections-style word puzzle.".into(),
        String::new(),
        "AVOID OVERUSED CONNECTIONS THEMES:".into(),
        "  Do not use: days of the week, seasons (spring/summer/fall/winter), months of the year,".into(),
        "  primary colors, planets, cardinal directions, card suits, or broad taxonomies like".into(),
        "  'Types of fruit' or 'US states'. These are the first things anyone thinks of.".into(),
        "  Also avoid: Monopoly properties, chess pieces, playing card ranks, dice games,".into(),
        "  or any other board game taxonomy. These have become the new default cliches.".into(),
        "  Choose something more specific, surprising, or cross-domain.".into(),
        String::new(),
        format!("CATEGORY TYPE: {}", category_type_description(request.category_type)),
        String::new(),
        format!("DIFFICULTY: {}", difficulty_description(request.difficulty)),
        String::new(),
        format!(
            "GROUP SIZE: Provide exactly {n} final words in 'words', plus {pool} total candidate \
             words in 'candidate_words' (the {pool} includes your final {n}).",
            pool = CANDIDATE_POOL_SIZE
        ),
        String::new(),
        "RULES:".into(),
        "  1. All words must be UPPERCASE.".into(),
        "  2. The category name must be specific and evocative, not generic labels like 'Animals' or 'Colors'."
            .into(),
        "  3. Words that appear in the category name must NOT appear in the word list.".into(),
        "  4. No word may appear in any existing group listed below.".into(),
    ];

    if request.existing.is_empty() {
        lines.push("  5. (First group: no red herring requirement. Focus on originality.)".into());
        lines.push(String::new());
        lines.push("EXISTING GROUPS: None, this is the first group.".into());
    } else {
        lines.extend(
            [
                "  5. RED HERRING: Among your candidate_words, at least one must be a word that:",
                "       (a) GENUINELY satisfies THIS group's category rule, it is a valid member, AND",
                "       (b) Could plausibly be mistaken for a member of a specific existing group,",
                "           causing a player to assign it to the wrong group.",
                "     In design_notes: name the red herring word, prove it passes (a), then name which",
                "     existing group it could be confused with and explain the surface-level similarity.",
                "     FORBIDDEN: Do NOT put words from existing groups into candidate_words just",
                "     because they appear there. If a word doesn't pass THIS group's rule, it is not",
                "     a red herring, it's a mistake. Every candidate_word must fit this category.",
            ]
            .map(String::from),
        );
        lines.push(String::new());
        lines.push("EXISTING GROUPS (do not reuse any of these words):".into());
        for (i, group) in request.existing.iter().enumerate() {
            lines.push(format!("  {}. {}: {}", i + 1, group.category_name, group.words.join(", ")));
        }
    }

    if let Some(hint) = request.hint {
        lines.push(String::new());
        lines.push(format!("PROPOSED CONCEPT: \"{}\"", hint));
        lines.push("  Use this as your starting point. You may refine the category_name wording,".into());
        lines.push("  but the core concept and theme MUST remain the same.".into());
    }

    lines.extend(
        [
            "",
            "WHEN CALLING THE TOOL, fill the fields in this order:",
            "  1. category_name: the specific label.",
            "  2. design_notes: write your rule statement, then prove EACH word letter-by-letter.",
            "     Only move on once every planned word has passed. If a word fails, replace it.",
            "  3. words: copy only the words that passed step 2.",
            "  4. candidate_words: copy only the 8 words that passed step 2.",
            "",
            "Do not fill words or candidate_words with unverified words.",
            "Call the submit_word_group tool now.",
        ]
        .map(String::from),
    );

    lines.join("\n")
}
