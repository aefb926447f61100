//! # lingua-db: Storage and Synchronization Engine
//!
//! SQLite persistence for lesson modules. Reconciles a nested lesson
//! document against the normalized schema in one atomic operation, reads
//! it back in the same shape, and deletes modules in dependency order.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Lingua Content Data Flow                            │
//! │                                                                         │
//! │  PATCH /modules/{id}  (content-api)                                     │
//! │       │  validate_document() (lingua-core)                              │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     lingua-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │  ModuleRepository ──► sync (coordinator, one transaction)       │   │
//! │  │                          │                                      │   │
//! │  │                          ▼                                      │   │
//! │  │                       blocks (one adapter per block kind)       │   │
//! │  │                          │                                      │   │
//! │  │                          ▼                                      │   │
//! │  │                       reconcile (singleton upsert,              │   │
//! │  │                                  list replacement)              │   │
//! │  │                                                                 │   │
//! │  │  ModuleRepository ──► cascade (bottom-up delete)                │   │
//! │  │  ModuleRepository ──► read (document assembly)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL, foreign keys on)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`schema`] - Table graph (parent links, dependency order)
//! - [`repository`] - Public entry points
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lingua_core::validation::validate_document;
//! use lingua_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/lingua.db")).await?;
//!
//! let doc = validate_document(r#"{ "grammar": { "title": "Cases", "rules": ["rule A"] } }"#)?;
//! let module = db.modules().synchronize(7, &doc).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod schema;

mod blocks;
mod cascade;
mod read;
mod reconcile;
mod sync;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::module::ModuleRepository;
pub use schema::Table;
