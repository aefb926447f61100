//! # Block Adapters
//!
//! One adapter per block kind. Each composes the reconciliation primitives
//! for its own subtree: upsert the singleton row, then replace each list
//! the document carries, scoped to the id the upsert returned.
//!
//! ```text
//! ┌───────────────────┬──────────────────────────┬─────────────────────────┐
//! │ Block             │ Singleton table          │ Lists (→ grandchildren) │
//! ├───────────────────┼──────────────────────────┼─────────────────────────┤
//! │ story             │ story_blocks             │ story_characters (*)    │
//! │ vocabulary        │ -                        │ vocabulary_items (*)    │
//! │ grammar           │ grammar_blocks           │ rules, examples,        │
//! │                   │                          │ exercises → options     │
//! │ pronunciation     │ pronunciation_blocks     │ minimal_pairs, exercises│
//! │ listening         │ listening_blocks         │ questions → options     │
//! │ speaking          │ speaking_blocks          │ exercises               │
//! │ reading           │ reading_blocks           │ questions → options     │
//! │ writing           │ writing_blocks           │ exercises               │
//! │ cultural          │ cultural_blocks          │ -                       │
//! │ quiz              │ -                        │ quiz_questions (*)      │
//! │                   │                          │ → quiz_options          │
//! │ missionChallenge  │ mission_challenges       │ requirements            │
//! └───────────────────┴──────────────────────────┴─────────────────────────┘
//!   (*) parented directly to the module
//! ```
//!
//! A list the document omits (`None`) is left alone; an empty list clears
//! it. Adapters are only reachable through the coordinator in `sync.rs`,
//! which owns the transaction.

use lingua_core::{
    ContentBlock, CulturalBlock, GrammarBlock, ListeningBlock, MissionChallengeBlock,
    PronunciationBlock, QuizQuestion, ReadingBlock, SpeakingBlock, StoryBlock, VocabularyItem,
    WritingBlock,
};
use sqlx::SqliteConnection;

use crate::error::DbResult;
use crate::reconcile::{reconcile_singleton, replace_list, replace_nested_list, ContentRow};
use crate::schema::Table;

/// Applies one block of a validated document to `module_id`.
pub(crate) async fn apply_block(
    conn: &mut SqliteConnection,
    module_id: i64,
    block: &ContentBlock,
) -> DbResult<()> {
    match block {
        ContentBlock::Story(story) => sync_story(conn, module_id, story).await,
        ContentBlock::Vocabulary(items) => sync_vocabulary(conn, module_id, items).await,
        ContentBlock::Grammar(grammar) => sync_grammar(conn, module_id, grammar).await,
        ContentBlock::Pronunciation(block) => sync_pronunciation(conn, module_id, block).await,
        ContentBlock::Listening(block) => sync_listening(conn, module_id, block).await,
        ContentBlock::Speaking(block) => sync_speaking(conn, module_id, block).await,
        ContentBlock::Reading(block) => sync_reading(conn, module_id, block).await,
        ContentBlock::Writing(block) => sync_writing(conn, module_id, block).await,
        ContentBlock::Cultural(block) => sync_cultural(conn, module_id, block).await,
        ContentBlock::Quiz(questions) => sync_quiz(conn, module_id, questions).await,
        ContentBlock::MissionChallenge(block) => {
            sync_mission_challenge(conn, module_id, block).await
        }
    }
}

// =============================================================================
// Module-Owned Lists
// =============================================================================

async fn sync_story(conn: &mut SqliteConnection, module_id: i64, story: &StoryBlock) -> DbResult<()> {
    // Characters belong to the module, not the story row, so a story that
    // only carries characters leaves the row alone
    if !story.columns().is_empty() {
        reconcile_singleton(conn, Table::StoryBlocks, module_id, story).await?;
    }

    if let Some(characters) = &story.characters {
        replace_list(conn, Table::StoryCharacters, module_id, characters).await?;
    }
    Ok(())
}

async fn sync_vocabulary(
    conn: &mut SqliteConnection,
    module_id: i64,
    items: &[VocabularyItem],
) -> DbResult<()> {
    replace_list(conn, Table::VocabularyItems, module_id, items).await?;
    Ok(())
}

async fn sync_quiz(
    conn: &mut SqliteConnection,
    module_id: i64,
    questions: &[QuizQuestion],
) -> DbResult<()> {
    replace_nested_list(conn, Table::QuizQuestions, Table::QuizOptions, module_id, questions)
        .await?;
    Ok(())
}

// =============================================================================
// Singleton Blocks
// =============================================================================

async fn sync_grammar(
    conn: &mut SqliteConnection,
    module_id: i64,
    grammar: &GrammarBlock,
) -> DbResult<()> {
    let grammar_id = reconcile_singleton(conn, Table::GrammarBlocks, module_id, grammar).await?;

    if let Some(rules) = &grammar.rules {
        replace_list(conn, Table::GrammarRules, grammar_id, rules).await?;
    }
    if let Some(examples) = &grammar.examples {
        replace_list(conn, Table::GrammarExamples, grammar_id, examples).await?;
    }
    if let Some(exercises) = &grammar.exercises {
        replace_nested_list(
            conn,
            Table::GrammarExercises,
            Table::GrammarExerciseOptions,
            grammar_id,
            exercises,
        )
        .await?;
    }
    Ok(())
}

async fn sync_pronunciation(
    conn: &mut SqliteConnection,
    module_id: i64,
    block: &PronunciationBlock,
) -> DbResult<()> {
    let pronunciation_id =
        reconcile_singleton(conn, Table::PronunciationBlocks, module_id, block).await?;

    if let Some(pairs) = &block.minimal_pairs {
        replace_list(conn, Table::MinimalPairs, pronunciation_id, pairs).await?;
    }
    if let Some(exercises) = &block.exercises {
        replace_list(conn, Table::PronunciationExercises, pronunciation_id, exercises).await?;
    }
    Ok(())
}

async fn sync_listening(
    conn: &mut SqliteConnection,
    module_id: i64,
    block: &ListeningBlock,
) -> DbResult<()> {
    let listening_id = reconcile_singleton(conn, Table::ListeningBlocks, module_id, block).await?;

    if let Some(questions) = &block.questions {
        replace_nested_list(
            conn,
            Table::ListeningQuestions,
            Table::ListeningQuestionOptions,
            listening_id,
            questions,
        )
        .await?;
    }
    Ok(())
}

async fn sync_speaking(
    conn: &mut SqliteConnection,
    module_id: i64,
    block: &SpeakingBlock,
) -> DbResult<()> {
    let speaking_id = reconcile_singleton(conn, Table::SpeakingBlocks, module_id, block).await?;

    if let Some(exercises) = &block.exercises {
        replace_list(conn, Table::SpeakingExercises, speaking_id, exercises).await?;
    }
    Ok(())
}

async fn sync_reading(
    conn: &mut SqliteConnection,
    module_id: i64,
    block: &ReadingBlock,
) -> DbResult<()> {
    let reading_id = reconcile_singleton(conn, Table::ReadingBlocks, module_id, block).await?;

    if let Some(questions) = &block.questions {
        replace_nested_list(
            conn,
            Table::ReadingQuestions,
            Table::ReadingQuestionOptions,
            reading_id,
            questions,
        )
        .await?;
    }
    Ok(())
}

async fn sync_writing(
    conn: &mut SqliteConnection,
    module_id: i64,
    block: &WritingBlock,
) -> DbResult<()> {
    let writing_id = reconcile_singleton(conn, Table::WritingBlocks, module_id, block).await?;

    if let Some(exercises) = &block.exercises {
        replace_list(conn, Table::WritingExercises, writing_id, exercises).await?;
    }
    Ok(())
}

async fn sync_cultural(
    conn: &mut SqliteConnection,
    module_id: i64,
    block: &CulturalBlock,
) -> DbResult<()> {
    reconcile_singleton(conn, Table::CulturalBlocks, module_id, block).await?;
    Ok(())
}

async fn sync_mission_challenge(
    conn: &mut SqliteConnection,
    module_id: i64,
    block: &MissionChallengeBlock,
) -> DbResult<()> {
    let mission_id =
        reconcile_singleton(conn, Table::MissionChallenges, module_id, block).await?;

    if let Some(requirements) = &block.requirements {
        replace_list(conn, Table::MissionRequirements, mission_id, requirements).await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
// Each adapter is exercised on its own connection, outside the coordinator,
// to show its subtree ends up matching exactly what it was given.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use lingua_core::{
        AnswerOption, ComprehensionQuestion, GrammarRule, MissionRequirement, NewModule, Patch,
        SpeakingExercise, StoryCharacter,
    };

    async fn setup() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let module = db.modules().create(&NewModule::titled("Unit 1")).await.unwrap();
        (db, module.id)
    }

    async fn count(conn: &mut SqliteConnection, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&mut *conn)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_story_characters_attach_to_module() {
        let (db, module_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let story = StoryBlock {
            title: Patch::Set("At the market".into()),
            characters: Some(vec![StoryCharacter {
                name: "Anna".into(),
                ..Default::default()
            }]),
            ..Default::default()
        };
        apply_block(&mut conn, module_id, &ContentBlock::Story(story))
            .await
            .unwrap();

        let owner: i64 = sqlx::query_scalar("SELECT module_id FROM story_characters")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(owner, module_id);
    }

    #[tokio::test]
    async fn test_characters_alone_create_no_story_row() {
        let (db, module_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let story = StoryBlock {
            characters: Some(vec![]),
            ..Default::default()
        };
        apply_block(&mut conn, module_id, &ContentBlock::Story(story))
            .await
            .unwrap();
        assert_eq!(count(&mut conn, "story_blocks").await, 0);

        let story = StoryBlock {
            characters: Some(vec![StoryCharacter {
                name: "Ivan".into(),
                ..Default::default()
            }]),
            ..Default::default()
        };
        apply_block(&mut conn, module_id, &ContentBlock::Story(story))
            .await
            .unwrap();
        assert_eq!(count(&mut conn, "story_blocks").await, 0);
        assert_eq!(count(&mut conn, "story_characters").await, 1);
    }

    #[tokio::test]
    async fn test_omitted_list_is_untouched() {
        let (db, module_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let grammar = GrammarBlock {
            title: Patch::Set("Cases".into()),
            rules: Some(vec![GrammarRule::new("rule A"), GrammarRule::new("rule B")]),
            ..Default::default()
        };
        apply_block(&mut conn, module_id, &ContentBlock::Grammar(grammar))
            .await
            .unwrap();

        // Only the explanation changes; rules are not mentioned
        let grammar = GrammarBlock {
            explanation: Patch::Set("Six cases".into()),
            ..Default::default()
        };
        apply_block(&mut conn, module_id, &ContentBlock::Grammar(grammar))
            .await
            .unwrap();

        assert_eq!(count(&mut conn, "grammar_rules").await, 2);
    }

    #[tokio::test]
    async fn test_listening_questions_with_options() {
        let (db, module_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let option = |text: &str| AnswerOption {
            text: text.into(),
            ..Default::default()
        };
        let listening = ListeningBlock {
            transcript: Patch::Set("Привет!".into()),
            questions: Some(vec![ComprehensionQuestion {
                question: "Who speaks?".into(),
                options: vec![option("Anna"), option("Ivan"), option("Both")],
                ..Default::default()
            }]),
            ..Default::default()
        };
        apply_block(&mut conn, module_id, &ContentBlock::Listening(listening))
            .await
            .unwrap();

        assert_eq!(count(&mut conn, "listening_blocks").await, 1);
        assert_eq!(count(&mut conn, "listening_questions").await, 1);
        assert_eq!(count(&mut conn, "listening_question_options").await, 3);
    }

    #[tokio::test]
    async fn test_speaking_and_mission_lists() {
        let (db, module_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let speaking = SpeakingBlock {
            exercises: Some(vec![SpeakingExercise {
                prompt: "Introduce yourself".into(),
                time_limit_secs: Some(60),
                ..Default::default()
            }]),
            ..Default::default()
        };
        apply_block(&mut conn, module_id, &ContentBlock::Speaking(speaking))
            .await
            .unwrap();

        let mission = MissionChallengeBlock {
            reward_xp: Patch::Set(50),
            requirements: Some(vec![
                MissionRequirement {
                    description: "Order a coffee".into(),
                    ..Default::default()
                },
                MissionRequirement {
                    description: "Ask for the bill".into(),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };
        apply_block(&mut conn, module_id, &ContentBlock::MissionChallenge(mission))
            .await
            .unwrap();

        assert_eq!(count(&mut conn, "speaking_exercises").await, 1);
        assert_eq!(count(&mut conn, "mission_requirements").await, 2);

        let emptied = MissionChallengeBlock {
            requirements: Some(vec![]),
            ..Default::default()
        };
        apply_block(&mut conn, module_id, &ContentBlock::MissionChallenge(emptied))
            .await
            .unwrap();

        assert_eq!(count(&mut conn, "mission_requirements").await, 0);
        assert_eq!(count(&mut conn, "mission_challenges").await, 1);
    }
}
