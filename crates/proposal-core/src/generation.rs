//! AI-assisted proposal generation and form autofill.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::prompt::{autofill_prompt, proposal_prompt};

/// Errors returned by a [`TextGenerator`].
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The generator is missing required configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The service rejected our credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The service is throttling us.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The request never completed.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered but the answer was unusable.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}

/// A text generation service that turns a prompt into free text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Name of the implementation, for logs.
    fn name(&self) -> &str;

    /// Model identifier reported in response metadata.
    fn model(&self) -> &str;
}

/// How the structured proposal was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationSource {
    /// The service returned a parseable JSON object.
    Structured,
    /// The service returned text that was not JSON; it was wrapped.
    Unstructured,
    /// The service failed; the proposal was synthesized locally.
    Fallback,
}

/// A generated proposal, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedProposal {
    pub proposal: Value,
    pub source: GenerationSource,
    pub generated_at: String,
}

/// Parse generator output as a JSON object.
///
/// Markdown code fences around the object are stripped first.
pub fn parse_generated(text: &str) -> Option<Map<String, Value>> {
    let cleaned = text.replace("```json", "").replace("```", "");
    match serde_json::from_str::<Value>(cleaned.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Generate a structured proposal.
///
/// Never fails: unparseable output is wrapped and a failing service is
/// replaced by a locally synthesized proposal.
pub async fn generate_proposal<G>(generator: &G, title: &str, content: &str) -> GeneratedProposal
where
    G: TextGenerator + ?Sized,
{
    let generated_at = now_timestamp();
    let prompt = proposal_prompt(title, content);

    info!(
        generator = generator.name(),
        content_len = content.len(),
        "Requesting proposal generation"
    );

    let (proposal, source) = match generator.generate(&prompt).await {
        Ok(text) => match parse_generated(&text) {
            Some(map) => (Value::Object(map), GenerationSource::Structured),
            None => {
                warn!(text_len = text.len(), "Generated proposal is not JSON, wrapping raw text");
                (unstructured_proposal(title, &text, &generated_at), GenerationSource::Unstructured)
            }
        },
        Err(err) => {
            warn!(error = %err, "Proposal generation failed, using local fallback");
            (fallback_proposal(title, content, &generated_at), GenerationSource::Fallback)
        }
    };

    GeneratedProposal {
        proposal,
        source,
        generated_at,
    }
}

fn unstructured_proposal(title: &str, text: &str, generated_at: &str) -> Value {
    let body = if text.trim().is_empty() {
        "No content generated"
    } else {
        text
    };

    json!({
        "title": title,
        "generatedAt": generated_at,
        "content": body,
        "sections": {
            "executiveSummary": "Generated proposal content",
            "fullProposal": body,
        },
    })
}

/// Minimal proposal built from the request alone.
pub fn fallback_proposal(title: &str, content: &str, generated_at: &str) -> Value {
    json!({
        "title": title,
        "generatedAt": generated_at,
        "fallback": true,
        "executiveSummary": content,
        "projectOverview": {
            "description": content,
            "objectives": [],
        },
        "sections": {
            "executiveSummary": "Proposal drafted from the submitted brief",
            "fullProposal": content,
        },
    })
}

/// Errors from [`autofill`].
#[derive(Debug, Error)]
pub enum AutofillError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The service answered with something other than a JSON object.
    #[error("the AI response was not in valid JSON format")]
    Unparseable,
}

/// Extract proposal form fields from a free-text description.
pub async fn autofill<G>(generator: &G, description: &str) -> Result<Map<String, Value>, AutofillError>
where
    G: TextGenerator + ?Sized,
{
    let text = generator.generate(&autofill_prompt(description)).await?;
    let parsed = parse_generated(&text).ok_or_else(|| {
        warn!(text_len = text.len(), "Autofill response is not JSON");
        AutofillError::Unparseable
    })?;

    Ok(merge_autofill(description, parsed))
}

/// Overlay parsed autofill fields on the defaults.
///
/// `techStack` and `modules` always come out as arrays.
pub fn merge_autofill(description: &str, parsed: Map<String, Value>) -> Map<String, Value> {
    let mut merged = autofill_defaults(description);
    merged.extend(parsed);

    for field in ["techStack", "modules"] {
        let coerced = match merged.remove(field) {
            Some(Value::Array(items)) => Value::Array(items),
            Some(Value::Null) | None => Value::Array(Vec::new()),
            Some(Value::String(s)) if s.is_empty() => Value::Array(Vec::new()),
            Some(Value::Bool(false)) => Value::Array(Vec::new()),
            Some(other) => Value::Array(vec![other]),
        };
        merged.insert(field.to_string(), coerced);
    }

    merged
}

fn autofill_defaults(description: &str) -> Map<String, Value> {
    let defaults = json!({
        "name": "",
        "clientName": "",
        "clientIndustry": "",
        "timelineStart": "",
        "timelineEnd": "",
        "budget": "",
        "techStack": [],
        "modules": [],
        "tone": "Professional and technical",
        "proposalType": "Project Proposal",
        "customPrompt": "",
        "latexContent": "",
        "goals": "",
        "challenges": "",
        "description": description,
        "title": "Project Proposal",
        "type": "Development Project",
        "priority": "medium",
    });

    match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
