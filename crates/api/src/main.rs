//! Propulso REST API server.
//!
//! Serves proposal generation, project management, user lookups and the
//! admin dashboard over JSON.

mod config;
mod error;
mod routes;
mod session;
mod state;

use std::sync::Arc;

use axum::http::{header, Method};
use database::Database;
use gemini_writer::GeminiWriter;
use proposal_core::TextGenerator;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, prefix = %config.prefix, policy = ?config.policy, "Starting API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let generator: Option<Arc<dyn TextGenerator>> = match config.gemini.clone() {
        Some(gemini) => Some(Arc::new(GeminiWriter::new(gemini)?)),
        None => {
            warn!("GEMINI_API_KEY not set, AI routes are disabled");
            None
        }
    };

    // Build application state
    let state = AppState::new(db, generator, config.policy);
    session::migrate_store(&state.sessions).await?;

    let cors = CorsLayer::new()
        .allow_origin(config.frontend_url.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Build router
    let app = routes::app(state, &config.prefix).layer(cors);

    // Start server
    info!(addr = %config.addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
