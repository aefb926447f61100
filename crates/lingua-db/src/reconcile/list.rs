//! # List Replacement Synchronizer
//!
//! Full replacement of a parent's list children. Not a diff: every call
//! discards the old rows and their ids, then writes the new list with
//! `position` set to each item's 0-based index.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::debug;

use super::{delete_in, parent_column, select_ids_in, ContentRow, NestedRow};
use crate::error::DbResult;
use crate::schema::Table;

/// Rows per multi-row INSERT statement.
const ROWS_PER_INSERT: usize = 100;

/// What a replacement did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Replaced {
    pub removed: u64,
    pub inserted: u64,
}

/// Replaces every row of `table` owned by `parent_id` with `items`.
///
/// An empty `items` deletes only.
pub(crate) async fn replace_list<R: ContentRow + Sync>(
    conn: &mut SqliteConnection,
    table: Table,
    parent_id: i64,
    items: &[R],
) -> DbResult<Replaced> {
    let parent = parent_column(table)?;

    let removed = delete_in(conn, table, parent, &[parent_id]).await?;

    let rows: Vec<(i64, i64, &R)> = items
        .iter()
        .enumerate()
        .map(|(position, item)| (parent_id, position as i64, item))
        .collect();
    let inserted = insert_rows(conn, table, &rows).await?;

    debug!(%table, parent_id, removed, inserted, "List replaced");
    Ok(Replaced { removed, inserted })
}

/// Replaces a two-level list: rows of `table` owned by `parent_id`, and
/// the `child_table` rows hanging off each of them.
///
/// ## Order
/// ```text
/// 1. SELECT ids of current rows
/// 2. DELETE child rows of those ids
/// 3. DELETE the rows
/// 4. for each new item: INSERT row → capture id → bulk INSERT its children
/// ```
/// Children need their parent's freshly assigned id, so rows are inserted
/// one at a time.
pub(crate) async fn replace_nested_list<R: NestedRow + Sync>(
    conn: &mut SqliteConnection,
    table: Table,
    child_table: Table,
    parent_id: i64,
    items: &[R],
) -> DbResult<Replaced> {
    let parent = parent_column(table)?;
    let child_parent = parent_column(child_table)?;

    let existing = select_ids_in(conn, table, parent, &[parent_id]).await?;
    let removed_children = delete_in(conn, child_table, child_parent, &existing).await?;
    let removed = delete_in(conn, table, parent, &[parent_id]).await?;

    let mut inserted = 0;
    let mut inserted_children = 0;

    for (position, item) in items.iter().enumerate() {
        let row_id = insert_one(conn, table, parent_id, position as i64, item).await?;
        inserted += 1;

        let children: Vec<(i64, i64, &R::Child)> = item
            .children()
            .iter()
            .enumerate()
            .map(|(child_position, child)| (row_id, child_position as i64, child))
            .collect();
        inserted_children += insert_rows(conn, child_table, &children).await?;
    }

    debug!(
        %table,
        %child_table,
        parent_id,
        removed,
        removed_children,
        inserted,
        inserted_children,
        "Nested list replaced"
    );
    Ok(Replaced { removed, inserted })
}

// =============================================================================
// Inserts
// =============================================================================

/// Builds `INSERT INTO table (parent, position, cols...) VALUES (...), ...`.
fn insert_statement<R: ContentRow>(
    table: Table,
    rows: &[(i64, i64, &R)],
) -> DbResult<Option<QueryBuilder<'static, Sqlite>>> {
    let Some((_, _, first)) = rows.first() else {
        return Ok(None);
    };

    let names = first
        .columns()
        .iter()
        .map(|(column, _)| *column)
        .fold(
            format!("{}, position", parent_column(table)?),
            |acc, column| acc + ", " + column,
        );

    let mut qb: QueryBuilder<'static, Sqlite> =
        QueryBuilder::new(format!("INSERT INTO {table} ({names}) "));

    qb.push_values(rows, |mut values, &(parent_id, position, item)| {
        values.push_bind(parent_id).push_bind(position);
        for (_, value) in item.columns() {
            value.bind(&mut values);
        }
    });

    Ok(Some(qb))
}

async fn insert_rows<R: ContentRow>(
    conn: &mut SqliteConnection,
    table: Table,
    rows: &[(i64, i64, &R)],
) -> DbResult<u64> {
    let mut inserted = 0;

    for chunk in rows.chunks(ROWS_PER_INSERT) {
        if let Some(mut qb) = insert_statement(table, chunk)? {
            inserted += qb.build().execute(&mut *conn).await?.rows_affected();
        }
    }

    Ok(inserted)
}

async fn insert_one<R: ContentRow>(
    conn: &mut SqliteConnection,
    table: Table,
    parent_id: i64,
    position: i64,
    item: &R,
) -> DbResult<i64> {
    let row = [(parent_id, position, item)];
    let mut qb = insert_statement(table, &row)?.ok_or_else(|| {
        crate::error::DbError::Internal(format!("empty insert into {table}"))
    })?;

    let result = qb.build().execute(&mut *conn).await?;
    Ok(result.last_insert_rowid())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use lingua_core::{AnswerOption, NewModule, QuizQuestion, VocabularyItem};

    async fn setup() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let module = db.modules().create(&NewModule::titled("Unit 1")).await.unwrap();
        (db, module.id)
    }

    fn word(word: &str) -> VocabularyItem {
        VocabularyItem {
            word: word.into(),
            ..Default::default()
        }
    }

    fn question(text: &str, options: usize) -> QuizQuestion {
        QuizQuestion {
            question: text.into(),
            options: (0..options)
                .map(|i| AnswerOption {
                    text: format!("{text}-{i}"),
                    is_correct: i == 0,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_replace_list_keeps_input_order() {
        let (db, module_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let items = vec![word("кот"), word("собака"), word("мышь")];
        let first = replace_list(&mut conn, Table::VocabularyItems, module_id, &items)
            .await
            .unwrap();
        assert_eq!(first, Replaced { removed: 0, inserted: 3 });

        let items = vec![word("мышь"), word("кот")];
        let second = replace_list(&mut conn, Table::VocabularyItems, module_id, &items)
            .await
            .unwrap();
        assert_eq!(second, Replaced { removed: 3, inserted: 2 });

        let words: Vec<(String, i64)> = sqlx::query_as(
            "SELECT word, position FROM vocabulary_items WHERE module_id = ? ORDER BY position",
        )
        .bind(module_id)
        .fetch_all(&mut *conn)
        .await
        .unwrap();
        assert_eq!(words, vec![("мышь".to_string(), 0), ("кот".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_empty_list_deletes_only() {
        let (db, module_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        replace_list(&mut conn, Table::VocabularyItems, module_id, &[word("кот")])
            .await
            .unwrap();
        let outcome = replace_list::<VocabularyItem>(&mut conn, Table::VocabularyItems, module_id, &[])
            .await
            .unwrap();
        assert_eq!(outcome, Replaced { removed: 1, inserted: 0 });
    }

    #[tokio::test]
    async fn test_nested_replace_leaves_no_orphans() {
        let (db, module_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let quiz: Vec<QuizQuestion> = (0..3).map(|i| question(&format!("q{i}"), 4)).collect();
        replace_nested_list(&mut conn, Table::QuizQuestions, Table::QuizOptions, module_id, &quiz)
            .await
            .unwrap();

        let quiz: Vec<QuizQuestion> = (0..2).map(|i| question(&format!("n{i}"), 2)).collect();
        let outcome = replace_nested_list(
            &mut conn,
            Table::QuizQuestions,
            Table::QuizOptions,
            module_id,
            &quiz,
        )
        .await
        .unwrap();
        assert_eq!(outcome, Replaced { removed: 3, inserted: 2 });

        let options: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_options")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(options, 4);

        let orphans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quiz_options o
             LEFT JOIN quiz_questions q ON q.id = o.question_id
             WHERE q.id IS NULL",
        )
        .fetch_one(&mut *conn)
        .await
        .unwrap();
        assert_eq!(orphans, 0);
    }
}
