//! # Cascade Deleter
//!
//! Removes a module and every descendant row in one transaction.
//!
//! ```text
//! Phase 1: resolve ids, top-down (Table::ALL forwards)
//!   modules {7}
//!   grammar_blocks WHERE module_id IN {7}          → {3}
//!   grammar_exercises WHERE grammar_id IN {3}      → {11, 12}
//!   grammar_exercise_options WHERE exercise_id IN {11, 12} → {...}
//!   ...
//!
//! Phase 2: delete, bottom-up (Table::ALL backwards)
//!   mission_requirements → mission_challenges → quiz_options → ...
//!   → grammar_exercise_options → grammar_exercises → grammar_blocks
//!   → ... → modules
//! ```
//!
//! Foreign keys are enforced and declared without `ON DELETE CASCADE`, so
//! any ordering mistake here fails loudly and rolls everything back.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::reconcile::{delete_in, select_ids_in};
use crate::schema::Table;
use crate::sync::{begin, settle};

/// Deletes `module_id` and all of its content.
///
/// ## Returns
/// Total number of rows removed, the module row included.
pub(crate) async fn delete_module(
    pool: &SqlitePool,
    timeout: Duration,
    module_id: i64,
) -> DbResult<u64> {
    let delete_id = Uuid::new_v4();
    let started = Instant::now();

    let mut tx = begin(pool).await?;
    let outcome = tokio::time::timeout(timeout, delete_tree(&mut tx, module_id)).await;
    let removed = settle(tx, outcome, timeout, delete_id).await?;

    info!(
        %delete_id,
        module_id,
        rows = removed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Module deleted"
    );
    Ok(removed)
}

async fn delete_tree(conn: &mut SqliteConnection, module_id: i64) -> DbResult<u64> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM modules WHERE id = ?")
        .bind(module_id)
        .fetch_optional(&mut *conn)
        .await?;
    if exists.is_none() {
        return Err(DbError::not_found("Module", module_id));
    }

    let ids = resolve_ids(conn, module_id).await?;

    let mut removed = 0;
    for table in Table::ALL.iter().rev() {
        let Some(table_ids) = ids.get(table).filter(|ids| !ids.is_empty()) else {
            continue;
        };
        let deleted = delete_in(conn, *table, "id", table_ids).await?;
        debug!(%table, deleted, "Rows deleted");
        removed += deleted;
    }

    Ok(removed)
}

/// Collects the ids of every row under `module_id`, keyed by table.
async fn resolve_ids(
    conn: &mut SqliteConnection,
    module_id: i64,
) -> DbResult<HashMap<Table, Vec<i64>>> {
    let mut ids: HashMap<Table, Vec<i64>> = HashMap::new();
    ids.insert(Table::Modules, vec![module_id]);

    for table in Table::ALL {
        let Some((parent, column)) = table.parent() else {
            continue;
        };

        let parent_ids = ids.get(&parent).cloned().unwrap_or_default();
        let found = if parent_ids.is_empty() {
            Vec::new()
        } else {
            select_ids_in(conn, table, column, &parent_ids).await?
        };
        ids.insert(table, found);
    }

    Ok(ids)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use lingua_core::NewModule;

    #[tokio::test]
    async fn test_missing_module_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let result = delete_module(db.pool(), db.transaction_timeout(), 77).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_bare_module_removes_one_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let module = db.modules().create(&NewModule::titled("Empty")).await.unwrap();

        let removed = delete_module(db.pool(), db.transaction_timeout(), module.id)
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(db.modules().get_by_id(module.id).await.unwrap().is_none());
    }
}
