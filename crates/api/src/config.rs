//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use gemini_writer::GeminiWriterConfig;
use proposal_core::AttributionPolicy;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Path prefix for every route, without a trailing slash.
    pub prefix: String,
    /// Origin allowed by CORS.
    pub frontend_url: HeaderValue,
    /// How proposal owners are resolved.
    pub policy: AttributionPolicy,
    /// Gemini settings, absent when `GEMINI_API_KEY` is unset.
    pub gemini: Option<GeminiWriterConfig>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `API_ADDR` | Server bind address | `127.0.0.1:8000` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:propulso.db?mode=rwc` |
    /// | `API_PREFIX` | Route prefix | `/api` |
    /// | `FRONTEND_URL` | CORS origin | `http://localhost:5173` |
    /// | `ATTRIBUTION_POLICY` | `strict` or `permissive` | `strict` |
    /// | `GEMINI_API_KEY` | Enables AI routes | (unset) |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("API_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:propulso.db?mode=rwc".to_string());

        let prefix = normalize_prefix(&env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()));

        let frontend_url = env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidFrontendUrl)?;

        let policy = match env::var("ATTRIBUTION_POLICY") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPolicy(value))?,
            Err(_) => AttributionPolicy::default(),
        };

        let gemini = GeminiWriterConfig::from_env().ok();

        Ok(Self {
            addr,
            database_url,
            prefix,
            frontend_url,
            policy,
            gemini,
        })
    }
}

/// Ensure a leading slash and strip trailing ones. `/` becomes empty.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API_ADDR format")]
    InvalidAddr,

    #[error("FRONTEND_URL is not a valid header value")]
    InvalidFrontendUrl,

    #[error("Invalid ATTRIBUTION_POLICY {0:?}, expected strict or permissive")]
    InvalidPolicy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/api"), "/api");
        assert_eq!(normalize_prefix("api/"), "/api");
        assert_eq!(normalize_prefix("/v2/api/"), "/v2/api");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }
}
