//! # lingua-core: Lesson Document Types for the Content Engine
//!
//! This crate defines the lesson document that the content engine
//! reconciles against the relational schema, and validates it. It contains
//! no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Lingua Content Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Lesson Editor (frontend)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP (JSON document)                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    content-api (axum)                           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lingua-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌────────────┐               │   │
//! │  │   │   types   │  │  document  │  │ validation │               │   │
//! │  │   │  Module   │  │  Grammar   │  │ Validated  │               │   │
//! │  │   │ BlockKind │  │  Quiz, ... │  │ Document   │               │   │
//! │  │   └───────────┘  └────────────┘  └────────────┘               │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    lingua-db (Storage Layer)                    │   │
//! │  │        reconciler, block adapters, coordinator, cascade         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Module row, module fields, block kind tags
//! - [`document`] - The nested lesson document
//! - [`patch`] - Keep / clear / set state of a document scalar
//! - [`validation`] - Boundary validation into [`ValidatedDocument`]
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use lingua_core::{validation::validate_document, BlockKind};
//!
//! let doc = validate_document(r#"{
//!     "title": "Unit 4",
//!     "grammar": { "title": "Cases", "rules": ["rule A", "rule B"] },
//!     "quiz": []
//! }"#).unwrap();
//!
//! let kinds: Vec<BlockKind> = doc.blocks().iter().map(|b| b.kind()).collect();
//! assert_eq!(kinds, vec![BlockKind::Grammar, BlockKind::Quiz]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod document;
pub mod error;
pub mod patch;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use document::*;
pub use error::{CoreError, CoreResult, ValidationError};
pub use patch::Patch;
pub use types::*;
pub use validation::ValidatedDocument;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum items in any single list of a document (per list, per level).
pub const MAX_LIST_ITEMS: usize = 500;

/// Maximum length of a title field, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a free-text field, in characters.
pub const MAX_TEXT_LENGTH: usize = 20_000;
