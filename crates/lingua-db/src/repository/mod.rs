//! # Repository Module
//!
//! Database repository implementations for lesson content.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler / seed binary                                             │
//! │       │                                                                 │
//! │       │  db.modules().synchronize(id, &doc)                             │
//! │       ▼                                                                 │
//! │  ModuleRepository                                                       │
//! │  ├── create / get_by_id / list                                          │
//! │  ├── get_document                                                       │
//! │  ├── synchronize ──► sync.rs (coordinator) ──► blocks.rs (adapters)     │
//! │  └── delete ───────► cascade.rs                                         │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ModuleRepository`](module::ModuleRepository) - Modules and their content

pub mod module;
