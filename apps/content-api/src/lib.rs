//! # Content API Library
//!
//! HTTP surface for the lesson editor. Every write goes through one
//! endpoint, `PATCH /modules/{id}`, which hands the whole document to the
//! synchronization engine.
//!
//! ## Module Organization
//! ```text
//! content_api/
//! ├── lib.rs          ◄─── You are here (state & router)
//! ├── routes.rs       ◄─── Handlers
//! ├── config.rs       ◄─── TOML + environment configuration
//! └── error.rs        ◄─── API error type and status mapping
//! ```
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET     /health          liveness + database check                     │
//! │  POST    /modules         create an empty module                        │
//! │  GET     /modules         list module rows                              │
//! │  GET     /modules/{id}    module with all content blocks                │
//! │  PATCH   /modules/{id}    synchronize a lesson document                 │
//! │  DELETE  /modules/{id}    delete module and every descendant            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;

use axum::routing::get;
use axum::Router;
use lingua_db::Database;
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db: Arc::new(db) }
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/modules",
            get(routes::list_modules).post(routes::create_module),
        )
        .route(
            "/modules/{id}",
            get(routes::get_module)
                .patch(routes::synchronize_module)
                .delete(routes::delete_module),
        )
        .with_state(state)
}
