//! # Reconciliation Primitives
//!
//! The two generic operations every block adapter is built from.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Reconciliation Primitives                           │
//! │                                                                         │
//! │  reconcile_singleton(table, parent_id, block)        singleton.rs       │
//! │    SELECT id WHERE parent = ?                                           │
//! │      ├── found  → UPDATE present fields   (id preserved)                │
//! │      └── absent → INSERT                  (new id captured)             │
//! │                                                                         │
//! │  replace_list(table, parent_id, items)               list.rs            │
//! │    DELETE WHERE parent = ? → bulk INSERT with position                  │
//! │                                                                         │
//! │  replace_nested_list(table, child, parent_id, items) list.rs            │
//! │    SELECT ids → DELETE options → DELETE rows                            │
//! │    → INSERT row (capture id) → bulk INSERT its options, per row         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows describe themselves through [`ContentRow`]: an ordered list of
//! `(column, value)` pairs. The primitives never know which document type
//! they are writing.
//!
//! None of these functions open or finish a transaction; they run on the
//! caller's connection and propagate every error unchanged.

pub(crate) mod list;
pub(crate) mod rows;
pub(crate) mod singleton;

use lingua_core::Patch;
use sqlx::query_builder::Separated;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::fmt::Display;

use crate::error::{DbError, DbResult};
use crate::schema::Table;

pub(crate) use list::{replace_list, replace_nested_list};
pub(crate) use singleton::{reconcile_singleton, update_columns};

/// Maximum ids bound into a single `IN (...)` clause.
const IDS_PER_STATEMENT: usize = 500;

// =============================================================================
// Field Values
// =============================================================================

/// A column value ready to be bound into a statement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Real(Option<f64>),
    Flag(bool),
}

impl FieldValue {
    pub(crate) fn text(value: &Option<String>) -> Self {
        FieldValue::Text(value.clone())
    }

    pub(crate) fn required(value: &str) -> Self {
        FieldValue::Text(Some(value.to_string()))
    }

    /// `None` for a kept field; an explicit clear binds NULL.
    pub(crate) fn patch_text(value: &Patch<String>) -> Option<Self> {
        value.clone().into_write().map(FieldValue::Text)
    }

    pub(crate) fn patch_integer(value: &Patch<i64>) -> Option<Self> {
        value.into_write().map(FieldValue::Integer)
    }

    pub(crate) fn patch_real(value: &Patch<f64>) -> Option<Self> {
        value.into_write().map(FieldValue::Real)
    }

    pub(crate) fn bind<'qb, 'args: 'qb, Sep: Display>(
        self,
        target: &mut Separated<'qb, 'args, Sqlite, Sep>,
    ) {
        match self {
            FieldValue::Text(v) => target.push_bind(v),
            FieldValue::Integer(v) => target.push_bind(v),
            FieldValue::Real(v) => target.push_bind(v),
            FieldValue::Flag(v) => target.push_bind(v),
        };
    }

    pub(crate) fn bind_unseparated<'qb, 'args: 'qb, Sep: Display>(
        self,
        target: &mut Separated<'qb, 'args, Sqlite, Sep>,
    ) {
        match self {
            FieldValue::Text(v) => target.push_bind_unseparated(v),
            FieldValue::Integer(v) => target.push_bind_unseparated(v),
            FieldValue::Real(v) => target.push_bind_unseparated(v),
            FieldValue::Flag(v) => target.push_bind_unseparated(v),
        };
    }
}

/// One `(column, value)` pair.
pub(crate) type Column = (&'static str, FieldValue);

// =============================================================================
// Row Traits
// =============================================================================

/// A document type that maps onto one table row.
///
/// Only the row's own scalar columns are listed: never `id`, never the
/// parent foreign key, never `position`, never child lists. Singleton
/// blocks and module fields leave out the columns they keep, so the list
/// is exactly what an update writes.
pub(crate) trait ContentRow {
    fn columns(&self) -> Vec<Column>;
}

/// A list row that owns a grandchild list (question → options).
pub(crate) trait NestedRow: ContentRow {
    type Child: ContentRow + Sync;

    fn children(&self) -> &[Self::Child];
}

// =============================================================================
// Shared Statements
// =============================================================================

pub(crate) fn parent_column(table: Table) -> DbResult<&'static str> {
    table
        .parent_column()
        .ok_or_else(|| DbError::Internal(format!("{table} has no parent table")))
}

/// Returns the ids of every row of `table` whose `column` is in `values`.
pub(crate) async fn select_ids_in(
    conn: &mut SqliteConnection,
    table: Table,
    column: &str,
    values: &[i64],
) -> DbResult<Vec<i64>> {
    let mut ids = Vec::new();

    for chunk in values.chunks(IDS_PER_STATEMENT) {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT id FROM {table} WHERE {column} IN ("));
        let mut list = qb.separated(", ");
        for value in chunk {
            list.push_bind(*value);
        }
        qb.push(") ORDER BY id");

        let found: Vec<i64> = qb.build_query_scalar::<i64>().fetch_all(&mut *conn).await?;
        ids.extend(found);
    }

    Ok(ids)
}

/// Deletes every row of `table` whose `column` is in `values`.
pub(crate) async fn delete_in(
    conn: &mut SqliteConnection,
    table: Table,
    column: &str,
    values: &[i64],
) -> DbResult<u64> {
    let mut deleted = 0;

    for chunk in values.chunks(IDS_PER_STATEMENT) {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("DELETE FROM {table} WHERE {column} IN ("));
        let mut list = qb.separated(", ");
        for value in chunk {
            list.push_bind(*value);
        }
        qb.push(")");

        deleted += qb.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(deleted)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_values() {
        assert_eq!(FieldValue::patch_text(&Patch::Keep), None);
        assert_eq!(
            FieldValue::patch_text(&Patch::Clear),
            Some(FieldValue::Text(None))
        );
        assert_eq!(
            FieldValue::patch_real(&Patch::Set(2.5)),
            Some(FieldValue::Real(Some(2.5)))
        );
        assert_eq!(FieldValue::patch_integer(&Patch::Keep), None);
    }

    #[test]
    fn test_parent_column_for_root_is_an_error() {
        assert!(parent_column(Table::Modules).is_err());
        assert_eq!(parent_column(Table::QuizOptions).unwrap(), "question_id");
    }
}
