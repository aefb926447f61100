//! # Document Assembly
//!
//! Rebuilds the nested document from its rows. Lists are ordered by
//! `position`, never by id, because every save recreates them.
//!
//! A singleton block that has a row comes back with all of its lists
//! present (possibly empty). Module-owned lists (`vocabulary`, `quiz`) are
//! always present.

use std::collections::HashMap;

use lingua_core::{
    AnswerOption, ComprehensionQuestion, GrammarBlock, GrammarExample, GrammarExercise,
    GrammarRule, ListeningBlock, MinimalPair, MissionChallengeBlock, MissionRequirement,
    ModuleContent, PronunciationBlock, PronunciationExercise, QuizQuestion, ReadingBlock,
    SpeakingBlock, SpeakingExercise, StoryBlock, StoryCharacter, VocabularyItem, WritingBlock,
    WritingExercise,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqliteConnection};

use crate::error::DbResult;
use crate::reconcile::parent_column;
use crate::schema::Table;

/// Loads every block of `module_id`.
pub(crate) async fn load_content(
    conn: &mut SqliteConnection,
    module_id: i64,
) -> DbResult<ModuleContent> {
    let story = load_story(conn, module_id).await?;
    let vocabulary = load_list::<VocabularyItem>(conn, Table::VocabularyItems, module_id).await?;

    let grammar = match load_singleton::<GrammarBlock>(conn, Table::GrammarBlocks, module_id).await? {
        Some(mut grammar) => {
            let id = grammar.id.unwrap_or_default();
            grammar.rules = Some(load_list::<GrammarRule>(conn, Table::GrammarRules, id).await?);
            grammar.examples =
                Some(load_list::<GrammarExample>(conn, Table::GrammarExamples, id).await?);

            let mut exercises =
                load_list::<GrammarExercise>(conn, Table::GrammarExercises, id).await?;
            let ids: Vec<i64> = exercises.iter().filter_map(|e| e.id).collect();
            let mut options = load_options(conn, Table::GrammarExerciseOptions, &ids).await?;
            for exercise in &mut exercises {
                exercise.options = take_options(&mut options, exercise.id);
            }
            grammar.exercises = Some(exercises);
            Some(grammar)
        }
        None => None,
    };

    let pronunciation =
        match load_singleton::<PronunciationBlock>(conn, Table::PronunciationBlocks, module_id)
            .await?
        {
            Some(mut block) => {
                let id = block.id.unwrap_or_default();
                block.minimal_pairs =
                    Some(load_list::<MinimalPair>(conn, Table::MinimalPairs, id).await?);
                block.exercises = Some(
                    load_list::<PronunciationExercise>(conn, Table::PronunciationExercises, id)
                        .await?,
                );
                Some(block)
            }
            None => None,
        };

    let listening =
        match load_singleton::<ListeningBlock>(conn, Table::ListeningBlocks, module_id).await? {
            Some(mut block) => {
                let id = block.id.unwrap_or_default();
                block.questions = Some(
                    load_questions(
                        conn,
                        Table::ListeningQuestions,
                        Table::ListeningQuestionOptions,
                        id,
                    )
                    .await?,
                );
                Some(block)
            }
            None => None,
        };

    let speaking =
        match load_singleton::<SpeakingBlock>(conn, Table::SpeakingBlocks, module_id).await? {
            Some(mut block) => {
                let id = block.id.unwrap_or_default();
                block.exercises =
                    Some(load_list::<SpeakingExercise>(conn, Table::SpeakingExercises, id).await?);
                Some(block)
            }
            None => None,
        };

    let reading =
        match load_singleton::<ReadingBlock>(conn, Table::ReadingBlocks, module_id).await? {
            Some(mut block) => {
                let id = block.id.unwrap_or_default();
                block.questions = Some(
                    load_questions(
                        conn,
                        Table::ReadingQuestions,
                        Table::ReadingQuestionOptions,
                        id,
                    )
                    .await?,
                );
                Some(block)
            }
            None => None,
        };

    let writing =
        match load_singleton::<WritingBlock>(conn, Table::WritingBlocks, module_id).await? {
            Some(mut block) => {
                let id = block.id.unwrap_or_default();
                block.exercises =
                    Some(load_list::<WritingExercise>(conn, Table::WritingExercises, id).await?);
                Some(block)
            }
            None => None,
        };

    let cultural = load_singleton(conn, Table::CulturalBlocks, module_id).await?;

    let mut quiz = load_list::<QuizQuestion>(conn, Table::QuizQuestions, module_id).await?;
    let ids: Vec<i64> = quiz.iter().filter_map(|q| q.id).collect();
    let mut options = load_options(conn, Table::QuizOptions, &ids).await?;
    for question in &mut quiz {
        question.options = take_options(&mut options, question.id);
    }

    let mission_challenge =
        match load_singleton::<MissionChallengeBlock>(conn, Table::MissionChallenges, module_id)
            .await?
        {
            Some(mut block) => {
                let id = block.id.unwrap_or_default();
                block.requirements = Some(
                    load_list::<MissionRequirement>(conn, Table::MissionRequirements, id).await?,
                );
                Some(block)
            }
            None => None,
        };

    Ok(ModuleContent {
        story,
        vocabulary: Some(vocabulary),
        grammar,
        pronunciation,
        listening,
        speaking,
        reading,
        writing,
        cultural,
        quiz: Some(quiz),
        mission_challenge,
    })
}

/// Story row plus the module's characters.
///
/// Characters without a story row still come back, under an otherwise
/// empty story.
async fn load_story(conn: &mut SqliteConnection, module_id: i64) -> DbResult<Option<StoryBlock>> {
    let story = load_singleton::<StoryBlock>(conn, Table::StoryBlocks, module_id).await?;
    let characters = load_list::<StoryCharacter>(conn, Table::StoryCharacters, module_id).await?;

    Ok(match story {
        Some(mut story) => {
            story.characters = Some(characters);
            Some(story)
        }
        None if !characters.is_empty() => Some(StoryBlock {
            characters: Some(characters),
            ..Default::default()
        }),
        None => None,
    })
}

// =============================================================================
// Generic Loaders
// =============================================================================

async fn load_singleton<T>(
    conn: &mut SqliteConnection,
    table: Table,
    parent_id: i64,
) -> DbResult<Option<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!(
        "SELECT * FROM {table} WHERE {} = ? ORDER BY id LIMIT 1",
        parent_column(table)?
    );
    let row = sqlx::query_as::<_, T>(&sql)
        .bind(parent_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

async fn load_list<T>(conn: &mut SqliteConnection, table: Table, parent_id: i64) -> DbResult<Vec<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!(
        "SELECT * FROM {table} WHERE {} = ? ORDER BY position, id",
        parent_column(table)?
    );
    let rows = sqlx::query_as::<_, T>(&sql)
        .bind(parent_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

async fn load_questions(
    conn: &mut SqliteConnection,
    table: Table,
    option_table: Table,
    parent_id: i64,
) -> DbResult<Vec<ComprehensionQuestion>> {
    let mut questions = load_list::<ComprehensionQuestion>(conn, table, parent_id).await?;
    let ids: Vec<i64> = questions.iter().filter_map(|q| q.id).collect();

    let mut options = load_options(conn, option_table, &ids).await?;
    for question in &mut questions {
        question.options = take_options(&mut options, question.id);
    }
    Ok(questions)
}

/// Options for every parent in `parent_ids`, grouped by parent, in
/// position order.
async fn load_options(
    conn: &mut SqliteConnection,
    table: Table,
    parent_ids: &[i64],
) -> DbResult<HashMap<i64, Vec<AnswerOption>>> {
    let mut grouped: HashMap<i64, Vec<AnswerOption>> = HashMap::new();
    if parent_ids.is_empty() {
        return Ok(grouped);
    }

    let parent = parent_column(table)?;
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT * FROM {table} WHERE {parent} IN ("));
    let mut list = qb.separated(", ");
    for id in parent_ids {
        list.push_bind(*id);
    }
    qb.push(format!(") ORDER BY {parent}, position, id"));

    let rows = qb.build().fetch_all(&mut *conn).await?;
    for row in rows {
        let owner: i64 = row.try_get(parent)?;
        grouped
            .entry(owner)
            .or_default()
            .push(AnswerOption::from_row(&row)?);
    }

    Ok(grouped)
}

fn take_options(options: &mut HashMap<i64, Vec<AnswerOption>>, id: Option<i64>) -> Vec<AnswerOption> {
    id.and_then(|id| options.remove(&id)).unwrap_or_default()
}
