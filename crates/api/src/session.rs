//! Session middleware.
//!
//! Cookie sessions are managed by `tower-sessions` with a SQLite store on the
//! application pool. The login flow stores the signed-in user's id under
//! [`USER_ID_KEY`]. Clients that cannot send cookies may pass the session id
//! as `Authorization: Bearer <id>` instead.
//!
//! A missing, unknown or expired session yields an empty [`Session`] rather
//! than an error; handlers decide what an anonymous request may do.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use database::models::User;
use time::Duration;
use tower_sessions::session::Id;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::SqliteStore;
use tracing::{debug, warn};

use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Session key holding the signed-in user's id.
pub const USER_ID_KEY: &str = "user_id";

/// Sessions expire after a day without requests.
const SESSION_IDLE_HOURS: i64 = 24;

/// The authenticated caller, if any.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// The user the session belongs to, when that user still exists.
    pub user: Option<User>,
    /// The id stored in the session.
    pub user_id: Option<String>,
}

/// Create the session table if it does not exist.
pub async fn migrate_store(store: &SqliteStore) -> database::Result<()> {
    store.migrate().await?;
    Ok(())
}

/// Cookie session layer over `store`.
pub fn layer(store: SqliteStore) -> SessionManagerLayer<SqliteStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_IDLE_HOURS)))
}

/// Session id passed as a bearer token.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

async fn bearer_user_id(store: &SqliteStore, token: &str) -> Option<String> {
    let Ok(id) = token.parse::<Id>() else {
        debug!("Malformed bearer session id");
        return None;
    };

    match store.load(&id).await {
        Ok(record) => record?.data.get(USER_ID_KEY)?.as_str().map(str::to_string),
        Err(err) => {
            warn!(error = %err, "Session lookup failed");
            None
        }
    }
}

async fn cookie_user_id(session: &tower_sessions::Session) -> Option<String> {
    match session.get::<String>(USER_ID_KEY).await {
        Ok(user_id) => user_id,
        Err(err) => {
            warn!(error = %err, "Session lookup failed");
            None
        }
    }
}

async fn load_user(state: &AppState, user_id: String) -> Session {
    let user = match database::user::get_user(state.db.pool(), &user_id).await {
        Ok(user) => Some(user),
        Err(err) => {
            debug!(user_id = %user_id, error = %err, "Session user did not resolve");
            None
        }
    };

    Session {
        user,
        user_id: Some(user_id),
    }
}

/// Attach a [`Session`] extension to the request.
///
/// Must run inside [`layer`].
pub async fn attach_session(
    State(state): State<AppState>,
    cookie_session: tower_sessions::Session,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = match bearer_token(request.headers()) {
        Some(token) => bearer_user_id(&state.sessions, &token).await,
        None => cookie_user_id(&cookie_session).await,
    };

    let session = match user_id {
        Some(user_id) => load_user(&state, user_id).await,
        None => Session::default(),
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{HeaderValue, Request};
    use proposal_core::AttributionPolicy;
    use serde_json::json;

    use crate::routes::test_support::*;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc123"));
    }

    fn add_project(cookie: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/project/add")
            .header("content-type", "application/json")
            .header("cookie", cookie)
            .body(Body::from(
                json!({
                    "name": "Clinic Portal",
                    "clientName": "Acme Health",
                    "clientIndustry": "Healthcare",
                    "timelineStart": "2025-01-01",
                    "timelineEnd": "2025-03-01",
                    "techStack": ["Rust"],
                    "modules": ["Booking"],
                    "goals": "Online booking",
                    "tone": "Friendly",
                })
                .to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_session_cookie_attributes_owner() {
        let db = test_db().await;
        let alice = add_user(&db, "alice@example.com").await;
        let session_id = issue_session(&db, &alice.id).await;
        let app = test_app(&db, None, AttributionPolicy::Strict);

        let (status, body) = send(
            app,
            add_project(&format!("theme=dark; {SESSION_COOKIE}={session_id}")),
        )
        .await;

        assert_eq!(status, 201);
        assert_eq!(body["owner"]["email"], "alice@example.com");
        assert_eq!(body["owner"]["attributedBy"], "session_user");
    }

    #[tokio::test]
    async fn test_unknown_session_cookie_is_anonymous() {
        let db = test_db().await;
        add_user(&db, "alice@example.com").await;
        let app = test_app(&db, None, AttributionPolicy::Strict);

        let (status, body) = send(app.clone(), add_project("session=not-a-session-id")).await;
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);

        let unknown = Id::default();
        let (status, _) = send(app, add_project(&format!("session={unknown}"))).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_dangling_session_keeps_stored_id() {
        let db = test_db().await;
        let session_id = issue_session(&db, "gone-user").await;
        let state = crate::state::AppState::new(db.clone(), None, AttributionPolicy::Strict);

        let user_id = bearer_user_id(&state.sessions, &session_id).await;
        assert_eq!(user_id.as_deref(), Some("gone-user"));

        let session = load_user(&state, "gone-user".to_string()).await;
        assert!(session.user.is_none());
        assert_eq!(session.user_id.as_deref(), Some("gone-user"));
    }
}
