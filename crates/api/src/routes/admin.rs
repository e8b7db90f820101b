//! Admin routes.

use axum::extract::{Path, State};
use axum::Json;
use database::DatabaseError;
use proposal_core::{list_proposals, normalize, normalize_simple, Listing, ListingTier, NormalizedProposal};
use serde_json::{json, Value};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Page size of the simple listing.
const SIMPLE_LIMIT: i64 = 20;

/// List all users, newest first.
pub async fn users(State(state): State<AppState>) -> Result<Json<Value>> {
    let users = database::user::list_users(state.db.pool()).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Users fetched successfully!",
        "count": users.len(),
        "users": users,
    })))
}

fn page(proposals: &[NormalizedProposal], limit: i64) -> Value {
    json!({
        "currentPage": 1,
        "totalPages": 1,
        "totalCount": proposals.len(),
        "limit": limit,
    })
}

fn listing_message(tier: ListingTier) -> &'static str {
    match tier {
        ListingTier::Full => "Proposals fetched successfully",
        ListingTier::Projected => "Proposals fetched successfully (raw query)",
        ListingTier::Minimal => "Proposals fetched (emergency fallback mode)",
    }
}

fn listing_body(listing: Listing) -> Value {
    let mut data = json!({
        "pagination": page(&listing.proposals, listing.limit),
        "tier": listing.tier,
        "note": listing.note,
        "proposals": listing.proposals,
    });
    if let Some(warning) = listing.warning {
        data["warning"] = json!(warning);
    }

    json!({
        "success": true,
        "message": listing_message(listing.tier),
        "data": data,
    })
}

/// List proposals through the tiered reads.
pub async fn all_proposals(State(state): State<AppState>) -> Result<Json<Value>> {
    let listing = list_proposals(&state.db, &ListingTier::ALL).await?;

    info!(
        tier = %listing.tier,
        count = listing.proposals.len(),
        "Served proposal listing"
    );

    Ok(Json(listing_body(listing)))
}

/// List proposals in the simplified shape, without document details.
pub async fn simple_proposals(State(state): State<AppState>) -> Result<Json<Value>> {
    let records = database::proposal::list_minimal(state.db.pool(), SIMPLE_LIMIT).await?;
    let proposals: Vec<_> = records
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize_simple(raw, index))
        .collect();

    Ok(Json(json!({
        "success": true,
        "message": "Proposals fetched successfully (simple mode)",
        "data": {
            "pagination": page(&proposals, SIMPLE_LIMIT),
            "note": "Simplified data to avoid type conflicts",
            "proposals": proposals,
        },
    })))
}

/// Fetch one proposal by id.
pub async fn proposal_by_id(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let raw = match database::proposal::get_raw(state.db.pool(), &id).await {
        Ok(raw) => raw,
        Err(DatabaseError::NotFound { .. }) => return Err(ApiError::NotFound("Proposal not found")),
        Err(err) => return Err(err.into()),
    };

    Ok(Json(json!({
        "success": true,
        "message": "Proposal details fetched successfully",
        "data": normalize(&raw, 0),
    })))
}
