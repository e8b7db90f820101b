//! Manually entered project routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use database::models::ProposalDocument;
use database::DatabaseError;
use proposal_core::normalize;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::proposals::{non_blank, owner_json, OwnerHints};
use crate::error::{ApiError, Result};
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub client_name: Option<String>,
    pub client_industry: Option<String>,
    pub timeline_start: Option<String>,
    pub timeline_end: Option<String>,
    /// Checked to be an array before use.
    pub tech_stack: Option<Value>,
    pub modules: Option<Value>,
    pub goals: Option<String>,
    pub challenges: Option<String>,
    pub tone: Option<String>,
    pub proposal_type: Option<String>,
    pub custom_prompt: Option<String>,
    pub latex_content: Option<String>,
    /// Accepted as a string or a number.
    pub budget: Option<Value>,
    #[serde(flatten)]
    pub owner: OwnerHints,
}

fn string_items(value: Value) -> Option<Vec<String>> {
    let Value::Array(items) = value else {
        return None;
    };
    Some(
        items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
    )
}

impl CreateProjectRequest {
    fn into_document(self) -> Result<(ProposalDocument, OwnerHints)> {
        let missing = || ApiError::BadRequest("Please provide all required fields".to_string());

        let name = non_blank(self.name).ok_or_else(missing)?;
        let client_name = non_blank(self.client_name).ok_or_else(missing)?;
        let client_industry = non_blank(self.client_industry).ok_or_else(missing)?;
        let timeline_start = non_blank(self.timeline_start).ok_or_else(missing)?;
        let timeline_end = non_blank(self.timeline_end).ok_or_else(missing)?;
        let goals = non_blank(self.goals).ok_or_else(missing)?;
        let tone = non_blank(self.tone).ok_or_else(missing)?;
        let (tech_stack, modules) = match (self.tech_stack, self.modules) {
            (Some(tech_stack), Some(modules)) => (tech_stack, modules),
            _ => return Err(missing()),
        };

        let not_arrays = || ApiError::BadRequest("Tech stack and modules must be arrays".to_string());
        let tech_stack = string_items(tech_stack).ok_or_else(not_arrays)?;
        let modules = string_items(modules).ok_or_else(not_arrays)?;

        let budget = match self.budget {
            Some(Value::String(s)) => non_blank(Some(s)),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let latex_content = non_blank(self.latex_content)
            .unwrap_or_else(|| json!({"title": name, "content": goals}).to_string());

        let document = ProposalDocument {
            name,
            client_name: Some(client_name),
            client_industry: Some(client_industry),
            timeline_start: Some(timeline_start),
            timeline_end: Some(timeline_end),
            tech_stack,
            modules,
            goals: Some(goals),
            challenges: non_blank(self.challenges),
            tone: Some(tone),
            proposal_type: non_blank(self.proposal_type),
            custom_prompt: non_blank(self.custom_prompt),
            latex_content: Some(latex_content),
            budget,
        };

        Ok((document, self.owner))
    }
}

/// Create a project from form input.
pub async fn add(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let (document, owner) = req.into_document()?;
    database::validation::validate_document(&document)?;

    if let Some(user_id) = owner.user_id.as_deref().filter(|id| !id.trim().is_empty()) {
        match database::user::get_user(state.db.pool(), user_id).await {
            Ok(_) => {}
            Err(DatabaseError::NotFound { .. } | DatabaseError::InvalidId { .. }) => {
                return Err(ApiError::NotFound("User not found"));
            }
            Err(err) => return Err(err.into()),
        }
    }

    let attribution = owner.resolve(&state, session).await?;
    let owner_id = attribution.user.as_ref().map(|u| u.id.as_str());

    let row = database::proposal::create_proposal(state.db.pool(), owner_id, &document).await?;
    let raw = database::proposal::get_raw(state.db.pool(), &row.id).await?;

    info!(proposal_id = %row.id, owner = ?owner_id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Project created successfully",
            "data": normalize(&raw, 0),
            "owner": owner_json(&attribution),
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct DeleteProjectRequest {
    pub id: Option<String>,
}

/// Delete a project by id.
pub async fn delete(
    State(state): State<AppState>,
    Json(req): Json<DeleteProjectRequest>,
) -> Result<Json<Value>> {
    let id = non_blank(req.id).ok_or_else(|| ApiError::BadRequest("Project ID is required".to_string()))?;

    match database::proposal::delete_proposal(state.db.pool(), &id).await {
        Ok(()) => {}
        Err(DatabaseError::NotFound { .. }) => return Err(ApiError::NotFound("Project not found")),
        Err(err) => return Err(err.into()),
    }

    info!(proposal_id = %id, "Project deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Project deleted successfully",
    })))
}
