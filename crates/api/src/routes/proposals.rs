//! AI proposal routes.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use database::models::{ProposalDocument, User};
use proposal_core::{normalize, resolve_owner, Attribution, AttributionRequest};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::session::Session;
use crate::state::AppState;

/// Ownership hints accepted alongside proposal writes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerHints {
    pub user_id: Option<String>,
    pub user_email: Option<String>,
}

impl OwnerHints {
    /// Resolve the owner from these hints and the caller's session.
    pub async fn resolve(self, state: &AppState, session: Session) -> Result<Attribution<User>> {
        let request = AttributionRequest::new()
            .session_user(session.user)
            .session_user_id(session.user_id)
            .user_id(self.user_id)
            .user_email(self.user_email);

        Ok(resolve_owner(&state.db, request, state.policy).await?)
    }
}

/// JSON summary of a resolved owner.
pub fn owner_json(attribution: &Attribution<User>) -> Value {
    match &attribution.user {
        Some(user) => json!({
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "attributedBy": attribution.strategy,
        }),
        None => Value::Null,
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(flatten)]
    pub owner: OwnerHints,
}

/// Generate a proposal with the text generator and store it.
pub async fn generate(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<Value>> {
    let (title, content) = match (non_blank(req.title), non_blank(req.content)) {
        (Some(title), Some(content)) => (title, content),
        _ => return Err(ApiError::BadRequest("Title and content are required".to_string())),
    };
    let generator = state.generator()?;

    let attribution = req.owner.resolve(&state, session).await?;
    let owner_id = attribution.user.as_ref().map(|u| u.id.as_str());

    let generated = proposal_core::generate_proposal(generator, &title, &content).await;

    let document = ProposalDocument {
        name: title.clone(),
        goals: Some(content.clone()),
        proposal_type: Some("AI Generated".to_string()),
        latex_content: Some(generated.proposal.to_string()),
        ..Default::default()
    };
    let row = database::proposal::create_proposal(state.db.pool(), owner_id, &document).await?;

    info!(
        proposal_id = %row.id,
        owner = ?owner_id,
        source = ?generated.source,
        "Generated proposal stored"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Proposal generated successfully",
        "id": row.id,
        "proposal": generated.proposal,
        "owner": owner_json(&attribution),
        "metadata": {
            "generatedAt": generated.generated_at,
            "model": generator.model(),
            "source": generated.source,
            "inputTitle": title,
            "inputLength": content.chars().count(),
        },
    })))
}

#[derive(Debug, Deserialize)]
pub struct AutofillRequest {
    pub description: Option<String>,
}

/// Extract proposal form fields from a free-text description.
pub async fn autofill(
    State(state): State<AppState>,
    Json(req): Json<AutofillRequest>,
) -> Result<Json<Map<String, Value>>> {
    let description = non_blank(req.description).ok_or_else(|| {
        ApiError::BadRequest("Description is required and must be a non-empty string".to_string())
    })?;
    let generator = state.generator()?;

    let fields = proposal_core::autofill(generator, &description).await?;
    Ok(Json(fields))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub content: Option<Value>,
}

/// Replace a proposal's generated content.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Value>> {
    let content = req
        .content
        .ok_or_else(|| ApiError::BadRequest("Content is required".to_string()))?;

    let row = database::proposal::update_content(state.db.pool(), &id, &content).await?;
    let raw = database::proposal::get_raw(state.db.pool(), &row.id).await?;

    info!(proposal_id = %row.id, "Proposal content updated");

    Ok(Json(json!({
        "success": true,
        "message": "Proposal updated successfully",
        "data": normalize(&raw, 0),
    })))
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
