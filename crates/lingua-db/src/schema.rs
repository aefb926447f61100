//! # Entity Graph
//!
//! Every table of the content schema and the foreign key that ties it to
//! its parent.
//!
//! ```text
//! modules
//! ├── story_blocks
//! ├── story_characters
//! ├── vocabulary_items
//! ├── grammar_blocks ─┬─ grammar_rules
//! │                   ├─ grammar_examples
//! │                   └─ grammar_exercises ── grammar_exercise_options
//! ├── pronunciation_blocks ─┬─ minimal_pairs
//! │                         └─ pronunciation_exercises
//! ├── listening_blocks ── listening_questions ── listening_question_options
//! ├── speaking_blocks ── speaking_exercises
//! ├── reading_blocks ── reading_questions ── reading_question_options
//! ├── writing_blocks ── writing_exercises
//! ├── cultural_blocks
//! ├── quiz_questions ── quiz_options
//! └── mission_challenges ── mission_requirements
//! ```
//!
//! [`Table::ALL`] lists parents before children. Walking it forwards
//! resolves ids top-down; walking it backwards deletes bottom-up.

/// A table of the content schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Modules,

    StoryBlocks,
    StoryCharacters,
    VocabularyItems,

    GrammarBlocks,
    GrammarRules,
    GrammarExamples,
    GrammarExercises,
    GrammarExerciseOptions,

    PronunciationBlocks,
    MinimalPairs,
    PronunciationExercises,

    ListeningBlocks,
    ListeningQuestions,
    ListeningQuestionOptions,

    SpeakingBlocks,
    SpeakingExercises,

    ReadingBlocks,
    ReadingQuestions,
    ReadingQuestionOptions,

    WritingBlocks,
    WritingExercises,

    CulturalBlocks,

    QuizQuestions,
    QuizOptions,

    MissionChallenges,
    MissionRequirements,
}

impl Table {
    /// Every table, parents strictly before their children.
    pub const ALL: [Table; 27] = [
        Table::Modules,
        Table::StoryBlocks,
        Table::StoryCharacters,
        Table::VocabularyItems,
        Table::GrammarBlocks,
        Table::GrammarRules,
        Table::GrammarExamples,
        Table::GrammarExercises,
        Table::GrammarExerciseOptions,
        Table::PronunciationBlocks,
        Table::MinimalPairs,
        Table::PronunciationExercises,
        Table::ListeningBlocks,
        Table::ListeningQuestions,
        Table::ListeningQuestionOptions,
        Table::SpeakingBlocks,
        Table::SpeakingExercises,
        Table::ReadingBlocks,
        Table::ReadingQuestions,
        Table::ReadingQuestionOptions,
        Table::WritingBlocks,
        Table::WritingExercises,
        Table::CulturalBlocks,
        Table::QuizQuestions,
        Table::QuizOptions,
        Table::MissionChallenges,
        Table::MissionRequirements,
    ];

    /// SQL table name.
    pub const fn name(&self) -> &'static str {
        match self {
            Table::Modules => "modules",
            Table::StoryBlocks => "story_blocks",
            Table::StoryCharacters => "story_characters",
            Table::VocabularyItems => "vocabulary_items",
            Table::GrammarBlocks => "grammar_blocks",
            Table::GrammarRules => "grammar_rules",
            Table::GrammarExamples => "grammar_examples",
            Table::GrammarExercises => "grammar_exercises",
            Table::GrammarExerciseOptions => "grammar_exercise_options",
            Table::PronunciationBlocks => "pronunciation_blocks",
            Table::MinimalPairs => "minimal_pairs",
            Table::PronunciationExercises => "pronunciation_exercises",
            Table::ListeningBlocks => "listening_blocks",
            Table::ListeningQuestions => "listening_questions",
            Table::ListeningQuestionOptions => "listening_question_options",
            Table::SpeakingBlocks => "speaking_blocks",
            Table::SpeakingExercises => "speaking_exercises",
            Table::ReadingBlocks => "reading_blocks",
            Table::ReadingQuestions => "reading_questions",
            Table::ReadingQuestionOptions => "reading_question_options",
            Table::WritingBlocks => "writing_blocks",
            Table::WritingExercises => "writing_exercises",
            Table::CulturalBlocks => "cultural_blocks",
            Table::QuizQuestions => "quiz_questions",
            Table::QuizOptions => "quiz_options",
            Table::MissionChallenges => "mission_challenges",
            Table::MissionRequirements => "mission_requirements",
        }
    }

    /// The parent table and the foreign-key column pointing at it.
    /// `None` only for [`Table::Modules`].
    pub const fn parent(&self) -> Option<(Table, &'static str)> {
        let link = match self {
            Table::Modules => return None,

            Table::StoryBlocks
            | Table::StoryCharacters
            | Table::VocabularyItems
            | Table::GrammarBlocks
            | Table::PronunciationBlocks
            | Table::ListeningBlocks
            | Table::SpeakingBlocks
            | Table::ReadingBlocks
            | Table::WritingBlocks
            | Table::CulturalBlocks
            | Table::QuizQuestions
            | Table::MissionChallenges => (Table::Modules, "module_id"),

            Table::GrammarRules | Table::GrammarExamples | Table::GrammarExercises => {
                (Table::GrammarBlocks, "grammar_id")
            }
            Table::GrammarExerciseOptions => (Table::GrammarExercises, "exercise_id"),

            Table::MinimalPairs | Table::PronunciationExercises => {
                (Table::PronunciationBlocks, "pronunciation_id")
            }

            Table::ListeningQuestions => (Table::ListeningBlocks, "listening_id"),
            Table::ListeningQuestionOptions => (Table::ListeningQuestions, "question_id"),

            Table::SpeakingExercises => (Table::SpeakingBlocks, "speaking_id"),

            Table::ReadingQuestions => (Table::ReadingBlocks, "reading_id"),
            Table::ReadingQuestionOptions => (Table::ReadingQuestions, "question_id"),

            Table::WritingExercises => (Table::WritingBlocks, "writing_id"),

            Table::QuizOptions => (Table::QuizQuestions, "question_id"),

            Table::MissionRequirements => (Table::MissionChallenges, "mission_id"),
        };
        Some(link)
    }

    /// Foreign-key column pointing at the parent.
    pub const fn parent_column(&self) -> Option<&'static str> {
        match self.parent() {
            Some((_, column)) => Some(column),
            None => None,
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_precede_children() {
        for (index, table) in Table::ALL.iter().enumerate() {
            if let Some((parent, _)) = table.parent() {
                let parent_index = Table::ALL.iter().position(|t| *t == parent).unwrap();
                assert!(
                    parent_index < index,
                    "{parent} must come before {table}"
                );
            }
        }
    }

    #[test]
    fn test_only_modules_is_a_root() {
        let roots: Vec<Table> = Table::ALL
            .iter()
            .copied()
            .filter(|t| t.parent().is_none())
            .collect();
        assert_eq!(roots, vec![Table::Modules]);
    }

    #[test]
    fn test_option_tables_hang_off_questions() {
        assert_eq!(
            Table::QuizOptions.parent(),
            Some((Table::QuizQuestions, "question_id"))
        );
        assert_eq!(
            Table::GrammarExerciseOptions.parent_column(),
            Some("exercise_id")
        );
    }
}
