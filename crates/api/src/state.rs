//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use proposal_core::{AttributionPolicy, TextGenerator};
use tower_sessions_sqlx_store::SqliteStore;

use crate::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Text generator for the AI routes, if one is configured.
    pub generator: Option<Arc<dyn TextGenerator>>,
    /// Owner resolution policy for new proposals.
    pub policy: AttributionPolicy,
    /// Session store, sharing the database pool.
    pub sessions: SqliteStore,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        generator: Option<Arc<dyn TextGenerator>>,
        policy: AttributionPolicy,
    ) -> Self {
        let sessions = SqliteStore::new(db.pool().clone());
        Self {
            db,
            generator,
            policy,
            sessions,
        }
    }

    /// The configured generator, or [`ApiError::NotConfigured`].
    pub fn generator(&self) -> Result<&dyn TextGenerator, ApiError> {
        self.generator.as_deref().ok_or(ApiError::NotConfigured)
    }
}
