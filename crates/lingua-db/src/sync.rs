//! # Transaction Coordinator
//!
//! The single atomicity boundary for module synchronization.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   synchronize_module(module_id, doc)                    │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── SELECT revision FROM modules ──► missing? → NotFound             │
//! │    ├── expectedRevision ≠ revision? ──► RevisionConflict                │
//! │    ├── UPDATE modules (mentioned scalars, revision + 1)                 │
//! │    ├── apply_block(story)                                               │
//! │    ├── apply_block(vocabulary)                                          │
//! │    ├── ...                        (only blocks the document carries)    │
//! │    └── apply_block(missionChallenge)                                    │
//! │    │                                                                    │
//! │  COMMIT ◄── all ok, within transaction_timeout                          │
//! │  ROLLBACK ◄── any error, or the timeout fires                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Blocks run sequentially on the transaction's connection. The module
//! update always runs before the first block.

use lingua_core::{Module, ValidatedDocument};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::time::{Duration, Instant};
use tokio::time::error::Elapsed;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::blocks::apply_block;
use crate::error::{DbError, DbResult};
use crate::reconcile::{update_columns, ContentRow, FieldValue};
use crate::schema::Table;

/// Synchronizes a module with a validated document in one transaction.
///
/// ## Returns
/// The module's scalar row as committed.
///
/// ## Errors
/// - `NotFound` if the module does not exist
/// - `RevisionConflict` if `expectedRevision` does not match
/// - `TransactionTimeout` if the whole body exceeds `timeout`
/// - any storage error raised by an adapter
///
/// On every error the transaction is rolled back.
pub(crate) async fn synchronize_module(
    pool: &SqlitePool,
    timeout: Duration,
    module_id: i64,
    document: &ValidatedDocument,
) -> DbResult<Module> {
    let sync_id = Uuid::new_v4();
    let started = Instant::now();

    debug!(%sync_id, module_id, blocks = document.blocks().len(), "Synchronization started");

    let mut tx = begin(pool).await?;
    let outcome = tokio::time::timeout(timeout, apply_document(&mut tx, module_id, document)).await;
    let module = settle(tx, outcome, timeout, sync_id).await?;

    info!(
        %sync_id,
        module_id,
        revision = module.revision,
        blocks = document.blocks().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Module synchronized"
    );

    Ok(module)
}

async fn apply_document(
    conn: &mut SqliteConnection,
    module_id: i64,
    document: &ValidatedDocument,
) -> DbResult<Module> {
    let revision: Option<i64> = sqlx::query_scalar("SELECT revision FROM modules WHERE id = ?")
        .bind(module_id)
        .fetch_optional(&mut *conn)
        .await?;
    let revision = revision.ok_or_else(|| DbError::not_found("Module", module_id))?;

    if let Some(expected) = document.expected_revision() {
        if expected != revision {
            return Err(DbError::RevisionConflict {
                expected,
                actual: revision,
            });
        }
    }

    // Module scalars first, with the revision bump
    let mut columns = document.module().columns();
    columns.push(("revision", FieldValue::Integer(Some(revision + 1))));
    update_columns(conn, Table::Modules, module_id, columns).await?;

    for block in document.blocks() {
        apply_block(conn, module_id, block).await?;
        debug!(module_id, block = %block.kind(), "Block applied");
    }

    let module = sqlx::query_as::<_, Module>("SELECT * FROM modules WHERE id = ?")
        .bind(module_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(module)
}

// =============================================================================
// Transaction Helpers
// =============================================================================

pub(crate) async fn begin(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    pool.begin()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

/// Commits on success; rolls back on an error or an elapsed timeout.
pub(crate) async fn settle<T>(
    tx: Transaction<'static, Sqlite>,
    outcome: Result<DbResult<T>, Elapsed>,
    timeout: Duration,
    operation_id: Uuid,
) -> DbResult<T> {
    let err = match outcome {
        Ok(Ok(value)) => {
            tx.commit()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            return Ok(value);
        }
        Ok(Err(err)) => err,
        Err(_) => DbError::TransactionTimeout {
            seconds: timeout.as_secs(),
        },
    };

    warn!(%operation_id, error = %err, "Rolling back transaction");
    if let Err(rollback_err) = tx.rollback().await {
        warn!(%operation_id, error = %rollback_err, "Rollback failed");
    }

    Err(err)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use lingua_core::validation::validate_value;
    use lingua_core::NewModule;
    use serde_json::json;

    async fn setup() -> (Database, Module) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let module = db.modules().create(&NewModule::titled("Unit 1")).await.unwrap();
        (db, module)
    }

    #[tokio::test]
    async fn test_revision_increments_per_sync() {
        let (db, module) = setup().await;
        assert_eq!(module.revision, 0);

        let doc = validate_value(json!({ "titleRu": "Модуль 1" })).unwrap();
        let updated = synchronize_module(db.pool(), db.transaction_timeout(), module.id, &doc)
            .await
            .unwrap();

        assert_eq!(updated.revision, 1);
        assert_eq!(updated.title, "Unit 1");
        assert_eq!(updated.title_ru.as_deref(), Some("Модуль 1"));
    }

    #[tokio::test]
    async fn test_null_module_field_clears_it() {
        let (db, module) = setup().await;

        let doc = validate_value(json!({ "descriptionRu": "x", "mapX": 40.0 })).unwrap();
        let set = synchronize_module(db.pool(), db.transaction_timeout(), module.id, &doc)
            .await
            .unwrap();
        assert_eq!(set.description_ru.as_deref(), Some("x"));

        // Omitted keeps, null clears
        let doc = validate_value(json!({ "descriptionRu": null })).unwrap();
        let cleared = synchronize_module(db.pool(), db.transaction_timeout(), module.id, &doc)
            .await
            .unwrap();
        assert_eq!(cleared.description_ru, None);
        assert_eq!(cleared.map_x, Some(40.0));
        assert_eq!(cleared.title, "Unit 1");
    }

    #[tokio::test]
    async fn test_stale_revision_is_rejected() {
        let (db, module) = setup().await;

        let doc = validate_value(json!({ "title": "v1", "expectedRevision": 0 })).unwrap();
        synchronize_module(db.pool(), db.transaction_timeout(), module.id, &doc)
            .await
            .unwrap();

        // Same editor saves again from the revision it loaded
        let stale = validate_value(json!({ "title": "v2", "expectedRevision": 0 })).unwrap();
        let result =
            synchronize_module(db.pool(), db.transaction_timeout(), module.id, &stale).await;
        assert!(matches!(
            result,
            Err(DbError::RevisionConflict {
                expected: 0,
                actual: 1
            })
        ));

        let title: String = sqlx::query_scalar("SELECT title FROM modules WHERE id = ?")
            .bind(module.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(title, "v1");
    }

    #[tokio::test]
    async fn test_unknown_module_is_not_found() {
        let (db, _) = setup().await;

        let doc = validate_value(json!({ "cultural": { "title": "Maslenitsa" } })).unwrap();
        let result = synchronize_module(db.pool(), db.transaction_timeout(), 404, &doc).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));

        let blocks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cultural_blocks")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(blocks, 0);
    }

    #[tokio::test]
    async fn test_zero_timeout_rolls_back() {
        let (db, module) = setup().await;

        let doc = validate_value(json!({ "title": "never" })).unwrap();
        let result = synchronize_module(db.pool(), Duration::ZERO, module.id, &doc).await;
        assert!(matches!(result, Err(DbError::TransactionTimeout { .. })));

        let stored = db.modules().get_by_id(module.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Unit 1");
        assert_eq!(stored.revision, 0);
    }
}
