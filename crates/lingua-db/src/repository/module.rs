//! # Module Repository
//!
//! Module lifecycle: create, read, synchronize, delete.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Module Operations                                │
//! │                                                                         │
//! │  create(NewModule)          INSERT modules           → Module           │
//! │  get_by_id(id)              SELECT modules           → Option<Module>   │
//! │  list()                     SELECT modules           → Vec<Module>      │
//! │  get_document(id)           SELECT every table       → Option<View>     │
//! │  synchronize(id, doc)       one transaction          → Module           │
//! │  delete(id)                 one transaction          → rows removed     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Adapters and reconciliation primitives are crate-private: the only way
//! to write content is [`ModuleRepository::synchronize`].

use std::time::Duration;

use chrono::Utc;
use lingua_core::{Module, ModuleView, NewModule, ValidatedDocument};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::cascade;
use crate::error::{DbError, DbResult};
use crate::read;
use crate::sync;

/// Repository for lesson modules.
#[derive(Debug, Clone)]
pub struct ModuleRepository {
    pool: SqlitePool,
    transaction_timeout: Duration,
}

impl ModuleRepository {
    /// Creates a new module repository.
    pub fn new(pool: SqlitePool, transaction_timeout: Duration) -> Self {
        ModuleRepository {
            pool,
            transaction_timeout,
        }
    }

    /// Creates a module with no content blocks.
    ///
    /// The new module starts at revision 0.
    pub async fn create(&self, module: &NewModule) -> DbResult<Module> {
        let now = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO modules (
                title, title_ru, level, description, description_ru,
                image_url, video_url, audio_url, map_x, map_y,
                revision, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(&module.title)
        .bind(&module.title_ru)
        .bind(module.level)
        .bind(&module.description)
        .bind(&module.description_ru)
        .bind(&module.image_url)
        .bind(&module.video_url)
        .bind(&module.audio_url)
        .bind(module.map_x)
        .bind(module.map_y)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(id, title = %module.title, "Module created");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::Internal(format!("module {id} vanished after insert")))
    }

    /// Gets a module's scalar row by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Module>> {
        let module = sqlx::query_as::<_, Module>("SELECT * FROM modules WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(module)
    }

    /// Lists every module, ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Module>> {
        let modules = sqlx::query_as::<_, Module>("SELECT * FROM modules ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        debug!(count = modules.len(), "Modules listed");
        Ok(modules)
    }

    /// Returns the module with all of its content, in document shape.
    ///
    /// Reads run on one connection inside a transaction so a concurrent
    /// synchronization is seen either entirely or not at all.
    pub async fn get_document(&self, id: i64) -> DbResult<Option<ModuleView>> {
        let mut tx = sync::begin(&self.pool).await?;

        let module = sqlx::query_as::<_, Module>("SELECT * FROM modules WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let view = match module {
            Some(module) => {
                let content = read::load_content(&mut tx, id).await?;
                Some(ModuleView { module, content })
            }
            None => None,
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(view)
    }

    /// Makes the stored module match `document`, atomically.
    ///
    /// See the `sync` module for the exact semantics.
    pub async fn synchronize(&self, id: i64, document: &ValidatedDocument) -> DbResult<Module> {
        sync::synchronize_module(&self.pool, self.transaction_timeout, id, document).await
    }

    /// Deletes a module and all of its content, atomically.
    ///
    /// ## Returns
    /// Number of rows removed across all tables.
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        cascade::delete_module(&self.pool, self.transaction_timeout, id).await
    }

    /// Counts modules.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM modules")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use lingua_core::ModuleLevel;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let repo = db.modules();

        let input = NewModule {
            title: "В кафе".into(),
            level: ModuleLevel::A2,
            map_x: Some(120.0),
            map_y: Some(45.5),
            ..Default::default()
        };
        let created = repo.create(&input).await.unwrap();

        assert!(created.id > 0);
        assert_eq!(created.revision, 0);
        assert_eq!(created.level, ModuleLevel::A2);

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = test_db().await;

        assert!(db.modules().get_by_id(42).await.unwrap().is_none());
        assert!(db.modules().get_document(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let db = test_db().await;
        let repo = db.modules();

        let first = repo.create(&NewModule::titled("One")).await.unwrap();
        let second = repo.create(&NewModule::titled("Two")).await.unwrap();

        let ids: Vec<i64> = repo.list().await.unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_fresh_module_document_has_empty_lists() {
        let db = test_db().await;
        let module = db.modules().create(&NewModule::titled("Blank")).await.unwrap();

        let view = db.modules().get_document(module.id).await.unwrap().unwrap();
        assert_eq!(view.module.id, module.id);
        assert_eq!(view.content.vocabulary, Some(vec![]));
        assert_eq!(view.content.quiz, Some(vec![]));
        assert!(view.content.grammar.is_none());
        assert!(view.content.story.is_none());
    }
}
