//! User routes.

use axum::extract::{Path, State};
use axum::Json;
use database::DatabaseError;
use proposal_core::normalize;
use serde_json::{json, Value};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Fetch a user's details by email.
pub async fn details(State(state): State<AppState>, Path(email): Path<String>) -> Result<Json<Value>> {
    let user = match database::user::get_user_by_email(state.db.pool(), &email).await {
        Ok(user) => user,
        Err(DatabaseError::NotFound { .. }) => return Err(ApiError::UnknownUser),
        Err(err) => return Err(err.into()),
    };

    Ok(Json(json!({
        "success": true,
        "message": "User Details Fetched Successfully!",
        "userInfo": user,
    })))
}

/// List a user's proposals, newest first.
pub async fn proposals(State(state): State<AppState>, Path(user_id): Path<String>) -> Result<Json<Value>> {
    let pool = state.db.pool();

    match database::user::get_user(pool, &user_id).await {
        Ok(_) => {}
        Err(DatabaseError::NotFound { .. } | DatabaseError::InvalidId { .. }) => {
            return Err(ApiError::NotFound("User not found"));
        }
        Err(err) => return Err(err.into()),
    }

    let records = database::proposal::list_raw_by_user(pool, &user_id).await?;
    let proposals: Vec<_> = records
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize(raw, index))
        .collect();

    tracing::debug!(user_id = %user_id, count = proposals.len(), "Fetched user proposals");

    Ok(Json(json!({
        "success": true,
        "message": "Proposals fetched successfully",
        "proposals": proposals,
    })))
}

#[cfg(test)]
mod tests {
    use proposal_core::AttributionPolicy;

    use crate::routes::test_support::*;

    #[tokio::test]
    async fn test_user_details() {
        let db = test_db().await;
        let alice = add_user(&db, "alice@example.com").await;
        let app = test_app(&db, None, AttributionPolicy::Strict);

        let (status, body) = send(app.clone(), get("/api/user/alice@example.com")).await;
        assert_eq!(status, 200);
        assert_eq!(body["userInfo"]["id"], alice.id.as_str());
        assert_eq!(body["userInfo"]["createdAt"], alice.created_at.as_str());

        let (status, body) = send(app, get("/api/user/nobody@example.com")).await;
        assert_eq!(status, 401);
        assert_eq!(body["message"], "User Does Not Exist");
    }

    #[tokio::test]
    async fn test_user_proposals_normalized() {
        let db = test_db().await;
        let alice = add_user(&db, "alice@example.com").await;
        database::proposal::insert_raw_document(
            db.pool(),
            Some(&alice.id),
            r#"{"name": 0, "techStack": "[\"Go\"]", "budget": null}"#,
        )
        .await
        .unwrap();
        let app = test_app(&db, None, AttributionPolicy::Strict);

        let (status, body) = send(app.clone(), get(&format!("/api/user/proposals/{}", alice.id))).await;
        assert_eq!(status, 200);
        let proposals = body["proposals"].as_array().unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0]["name"], "Untitled Proposal");
        assert_eq!(proposals[0]["techStack"], serde_json::json!(["Go"]));
        assert!(proposals[0]["budget"].is_null());

        let (status, _) = send(app, get("/api/user/proposals/not-a-user")).await;
        assert_eq!(status, 404);
    }
}
