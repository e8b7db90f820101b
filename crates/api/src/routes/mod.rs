//! Route handlers for the API server.

pub mod admin;
pub mod analytics;
pub mod health;
pub mod projects;
pub mod proposals;
pub mod users;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::session::{self, attach_session};
use crate::state::AppState;

/// Build the router with all routes, relative to the API prefix.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        // Proposal generation
        .route("/proposal/generate", post(proposals::generate))
        .route("/proposal/autofill", post(proposals::autofill))
        .route("/proposal/update/:id", put(proposals::update))
        // Manually entered projects
        .route("/project/add", post(projects::add))
        .route("/project/del", post(projects::delete))
        // Users
        .route("/user/proposals/:user_id", get(users::proposals))
        .route("/user/:email", get(users::details))
        // Admin
        .route("/admin/users", get(admin::users))
        .route("/admin/proposals/all", get(admin::all_proposals))
        .route("/admin/proposals/simple", get(admin::simple_proposals))
        .route("/admin/proposals/:id", get(admin::proposal_by_id))
        .route("/admin/analytics/summary", get(analytics::summary))
        .route("/admin/analytics/user-growth", get(analytics::user_growth))
}

/// Mount the routes under `prefix` with session and tracing layers.
pub fn app(state: AppState, prefix: &str) -> Router {
    let routes = if prefix.is_empty() {
        router()
    } else {
        Router::new().nest(prefix, router())
    };

    routes
        .layer(middleware::from_fn_with_state(state.clone(), attach_session))
        .layer(session::layer(state.sessions.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use proposal_core::AttributionPolicy;

    #[tokio::test]
    async fn test_health_under_prefix() {
        let db = test_db().await;

        let (status, body) = send(test_app(&db, None, AttributionPolicy::Strict), get("/api/health")).await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");

        let (status, _) = send(test_app(&db, None, AttributionPolicy::Strict), get("/health")).await;
        assert_eq!(status, 404);
    }
}
