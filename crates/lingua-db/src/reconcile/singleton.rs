//! # Entity Reconciler
//!
//! Upsert of a singleton block row, keyed by its parent.
//!
//! The schema carries `UNIQUE(module_id)` on every singleton table, so the
//! lookup below can match at most one row. It still takes the first match
//! by id so the behavior stays defined on a database that predates the
//! constraint.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::debug;

use super::{parent_column, Column, ContentRow};
use crate::error::DbResult;
use crate::schema::Table;

/// Makes the singleton row of `table` owned by `parent_id` match `block`.
///
/// ## Behavior
/// - Existing row: the fields the block mentions are written (an explicit
///   clear writes NULL), its id is kept, so list children can keep
///   pointing at it
/// - No row: one is inserted with the mentioned fields; the rest stay NULL
///
/// ## Returns
/// The row's id, usable as a foreign key for the rest of the transaction.
pub(crate) async fn reconcile_singleton<B: ContentRow>(
    conn: &mut SqliteConnection,
    table: Table,
    parent_id: i64,
    block: &B,
) -> DbResult<i64> {
    let parent = parent_column(table)?;

    let sql = format!("SELECT id FROM {table} WHERE {parent} = ? ORDER BY id LIMIT 1");
    let existing: Option<i64> = sqlx::query_scalar(&sql)
        .bind(parent_id)
        .fetch_optional(&mut *conn)
        .await?;

    let present: Vec<Column> = block.columns();

    match existing {
        Some(id) => {
            update_columns(conn, table, id, present).await?;
            debug!(%table, parent_id, id, "Singleton updated in place");
            Ok(id)
        }
        None => {
            let id = insert_singleton(conn, table, parent, parent_id, present).await?;
            debug!(%table, parent_id, id, "Singleton created");
            Ok(id)
        }
    }
}

/// Updates the given columns of one row and stamps `updated_at`.
///
/// With no columns, only the timestamp changes.
pub(crate) async fn update_columns(
    conn: &mut SqliteConnection,
    table: Table,
    id: i64,
    columns: Vec<Column>,
) -> DbResult<u64> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("UPDATE {table} SET "));

    {
        let mut set = qb.separated(", ");
        for (column, value) in columns {
            set.push(format!("{column} = "));
            value.bind_unseparated(&mut set);
        }
        set.push("updated_at = ");
        set.push_bind_unseparated(Utc::now());
    }

    qb.push(" WHERE id = ");
    qb.push_bind(id);

    let result = qb.build().execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

async fn insert_singleton(
    conn: &mut SqliteConnection,
    table: Table,
    parent: &str,
    parent_id: i64,
    columns: Vec<Column>,
) -> DbResult<i64> {
    let names = columns
        .iter()
        .map(|(column, _)| *column)
        .chain(["created_at", "updated_at"])
        .fold(parent.to_string(), |acc, column| acc + ", " + column);

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("INSERT INTO {table} ({names}) VALUES ("));

    {
        let now = Utc::now();
        let mut values = qb.separated(", ");
        values.push_bind(parent_id);
        for (_, value) in columns {
            value.bind(&mut values);
        }
        values.push_bind(now);
        values.push_bind(now);
    }
    qb.push(")");

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
    use lingua_core::{CulturalBlock, GrammarBlock, NewModule, Patch};

    async fn setup() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let module = db.modules().create(&NewModule::titled("Unit 1")).await.unwrap();
        (db, module.id)
    }

    #[tokio::test]
    async fn test_insert_then_update_keeps_id() {
        let (db, module_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let first = GrammarBlock {
            title: Patch::Set("Cases".into()),
            explanation: Patch::Set("v1".into()),
            ..Default::default()
        };
        let id = reconcile_singleton(&mut conn, Table::GrammarBlocks, module_id, &first)
            .await
            .unwrap();

        let second = GrammarBlock {
            explanation: Patch::Set("v2".into()),
            ..Default::default()
        };
        let again = reconcile_singleton(&mut conn, Table::GrammarBlocks, module_id, &second)
            .await
            .unwrap();
        assert_eq!(id, again);

        // Omitted title is left as it was
        let (title, explanation): (Option<String>, Option<String>) =
            sqlx::query_as("SELECT title, explanation FROM grammar_blocks WHERE id = ?")
                .bind(id)
                .fetch_one(&mut *conn)
                .await
                .unwrap();
        assert_eq!(title.as_deref(), Some("Cases"));
        assert_eq!(explanation.as_deref(), Some("v2"));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM grammar_blocks")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_explicit_clear_writes_null() {
        let (db, module_id) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let first = CulturalBlock {
            title: Patch::Set("Maslenitsa".into()),
            video_url: Patch::Set("http://v".into()),
            ..Default::default()
        };
        let id = reconcile_singleton(&mut conn, Table::CulturalBlocks, module_id, &first)
            .await
            .unwrap();

        let cleared = CulturalBlock {
            video_url: Patch::Clear,
            ..Default::default()
        };
        reconcile_singleton(&mut conn, Table::CulturalBlocks, module_id, &cleared)
            .await
            .unwrap();

        let (title, video_url): (Option<String>, Option<String>) =
            sqlx::query_as("SELECT title, video_url FROM cultural_blocks WHERE id = ?")
                .bind(id)
                .fetch_one(&mut *conn)
                .await
                .unwrap();
        assert_eq!(title.as_deref(), Some("Maslenitsa"));
        assert_eq!(video_url, None);
    }

    #[tokio::test]
    async fn test_missing_parent_is_rejected() {
        let (db, _) = setup().await;
        let mut conn = db.pool().acquire().await.unwrap();

        let block = GrammarBlock {
            title: Patch::Set("Orphan".into()),
            ..Default::default()
        };
        let result = reconcile_singleton(&mut conn, Table::GrammarBlocks, 9999, &block).await;
        assert!(matches!(
            result,
            Err(crate::error::DbError::ForeignKeyViolation { .. })
        ));
    }
}
