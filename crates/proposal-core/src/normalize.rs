//! Coercion of raw stored proposals into a response-safe view.
//!
//! Stored documents have drifted over time: budgets that are numbers in one
//! row and strings in the next, tech stacks saved as JSON strings, missing
//! owners. Every function here accepts any [`RawRecord`] and never fails.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::record::{id_form, is_truthy, string_form, timestamp_form, truthy_string, RawRecord};

pub const UNTITLED_PROPOSAL: &str = "Untitled Proposal";
pub const UNKNOWN_CLIENT: &str = "Unknown Client";
pub const UNKNOWN_INDUSTRY: &str = "Unknown Industry";
pub const UNKNOWN_OWNER_NAME: &str = "Unknown";
pub const UNKNOWN_OWNER_EMAIL: &str = "No email";
pub const GOALS_UNAVAILABLE: &str = "Unable to load goals";
pub const TECH_STACK_UNAVAILABLE: &str = "Tech stack unavailable";
pub const MODULES_UNAVAILABLE: &str = "Modules unavailable";

/// Owner details embedded in a normalized proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalOwner {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// A proposal with every field coerced to a guaranteed type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedProposal {
    pub id: String,
    pub name: String,
    pub client_name: String,
    pub client_industry: String,
    pub budget: Option<String>,
    pub timeline_start: Option<String>,
    pub timeline_end: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub user: Option<ProposalOwner>,
    pub goals: String,
    pub tech_stack: Vec<String>,
    pub modules: Vec<String>,
    pub tone: Option<String>,
    pub proposal_type: Option<String>,
    pub challenges: Option<String>,
    pub has_latex_content: bool,
}

/// Normalize one stored record.
///
/// `index` is the record's position in the current page and only feeds the
/// synthesized `temp-id-<index>` identifier.
pub fn normalize(raw: &RawRecord, index: usize) -> NormalizedProposal {
    let now = now_timestamp();
    let created_at = timestamp_form(raw.get("createdAt"));
    let updated_at = timestamp_form(raw.get("updatedAt")).or_else(|| created_at.clone());

    NormalizedProposal {
        id: record_id(raw).unwrap_or_else(|| format!("temp-id-{index}")),
        name: text_or(raw, "name", UNTITLED_PROPOSAL),
        client_name: text_or(raw, "clientName", UNKNOWN_CLIENT),
        client_industry: text_or(raw, "clientIndustry", UNKNOWN_INDUSTRY),
        budget: truthy_string(raw.get("budget")),
        timeline_start: timestamp_form(raw.get("timelineStart")),
        timeline_end: timestamp_form(raw.get("timelineEnd")),
        created_at: created_at.unwrap_or_else(|| now.clone()),
        updated_at: updated_at.unwrap_or(now),
        user: raw.get("user").and_then(owner),
        goals: goals(raw.get("goals")),
        tech_stack: string_list(raw.get("techStack"), TECH_STACK_UNAVAILABLE),
        modules: string_list(raw.get("modules"), MODULES_UNAVAILABLE),
        tone: truthy_string(raw.get("tone")),
        proposal_type: truthy_string(raw.get("proposalType")),
        challenges: truthy_string(raw.get("challenges")),
        has_latex_content: raw.get("latexContent").map(is_truthy).unwrap_or(false),
    }
}

/// Emergency shape used when only a handful of fields could be read.
pub fn normalize_minimal(raw: &RawRecord, index: usize) -> NormalizedProposal {
    let now = now_timestamp();
    let created_at = timestamp_form(raw.get("createdAt")).unwrap_or(now);

    NormalizedProposal {
        id: record_id(raw).unwrap_or_else(|| format!("fallback-{index}")),
        name: text_or(raw, "name", "Proposal"),
        client_name: text_or(raw, "clientName", "Client"),
        client_industry: "N/A".to_string(),
        goals: "Data temporarily unavailable due to database inconsistencies".to_string(),
        ..placeholder(created_at)
    }
}

/// Shape served by the admin "simple mode" listing.
pub fn normalize_simple(raw: &RawRecord, index: usize) -> NormalizedProposal {
    let now = now_timestamp();
    let created_at = timestamp_form(raw.get("createdAt")).unwrap_or(now);

    NormalizedProposal {
        id: record_id(raw).unwrap_or_else(|| format!("simple-{index}")),
        name: text_or(raw, "name", UNTITLED_PROPOSAL),
        client_name: text_or(raw, "clientName", UNKNOWN_CLIENT),
        client_industry: "Data Cleanup Required".to_string(),
        tech_stack: owned(&["Mixed", "Data", "Types"]),
        modules: owned(&["Database", "Cleanup", "Needed"]),
        goals: "Please clean up database to see full proposal details".to_string(),
        user: Some(ProposalOwner {
            id: Some("system".to_string()),
            name: "System".to_string(),
            email: "system@admin.com".to_string(),
            avatar: None,
        }),
        ..placeholder(created_at)
    }
}

fn placeholder(created_at: String) -> NormalizedProposal {
    NormalizedProposal {
        id: String::new(),
        name: String::new(),
        client_name: String::new(),
        client_industry: String::new(),
        budget: None,
        timeline_start: None,
        timeline_end: None,
        updated_at: created_at.clone(),
        created_at,
        user: None,
        goals: String::new(),
        tech_stack: Vec::new(),
        modules: Vec::new(),
        tone: None,
        proposal_type: None,
        challenges: None,
        has_latex_content: false,
    }
}

fn record_id(raw: &RawRecord) -> Option<String> {
    id_form(raw.get("_id")).or_else(|| id_form(raw.get("id")))
}

fn text_or(raw: &RawRecord, field: &str, default: &str) -> String {
    truthy_string(raw.get(field)).unwrap_or_else(|| default.to_string())
}

fn owner(value: &Value) -> Option<ProposalOwner> {
    let Value::Object(map) = value else {
        return None;
    };
    let user = RawRecord::from(map.clone());

    Some(ProposalOwner {
        id: record_id(&user),
        name: text_or(&user, "name", UNKNOWN_OWNER_NAME),
        email: text_or(&user, "email", UNKNOWN_OWNER_EMAIL),
        avatar: truthy_string(user.get("avatar")),
    })
}

fn goals(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(_)) | Some(Value::Object(_)) => GOALS_UNAVAILABLE.to_string(),
        other => truthy_string(other).unwrap_or_default(),
    }
}

/// Coerce a list-ish field into a list of strings.
///
/// Arrays are stringified element by element, strings that look like JSON
/// arrays are parsed, and any other non-empty string becomes a single entry.
fn string_list(value: Option<&Value>, unavailable: &str) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(string_form).collect(),
        Some(Value::String(s)) if s.starts_with('[') => {
            match serde_json::from_str::<Vec<Value>>(s) {
                Ok(items) => items.iter().map(string_form).collect(),
                Err(err) => {
                    debug!(error = %err, "Stored list is not a valid JSON array");
                    vec![unavailable.to_string()]
                }
            }
        }
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
