//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// UUID (e.g., "c27fb365-0c84-4cf2-8555-814bb065e448")
    pub id: String,
    /// Unique email address
    pub email: String,
    /// Display name
    pub name: String,
    pub phone: Option<String>,
    /// Account role, "User" unless promoted
    pub role: String,
    /// Avatar URL
    pub avatar: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

/// Fields for creating a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    /// Defaults to "User" when unset.
    pub role: Option<String>,
    pub avatar: Option<String>,
}

/// A stored proposal row with its document still encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ProposalRow {
    pub id: String,
    /// Owning user, not guaranteed to exist.
    pub user_id: Option<String>,
    /// JSON document; field types are not enforced.
    pub document: String,
    pub created_at: String,
    pub updated_at: String,
}

/// The body written for new proposals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDocument {
    pub name: String,
    pub client_name: Option<String>,
    pub client_industry: Option<String>,
    pub timeline_start: Option<String>,
    pub timeline_end: Option<String>,
    pub tech_stack: Vec<String>,
    pub modules: Vec<String>,
    pub goals: Option<String>,
    pub challenges: Option<String>,
    pub tone: Option<String>,
    pub proposal_type: Option<String>,
    pub custom_prompt: Option<String>,
    /// Serialized generated content.
    pub latex_content: Option<String>,
    pub budget: Option<String>,
}
