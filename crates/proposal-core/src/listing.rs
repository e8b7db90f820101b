//! Tiered proposal listing.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::fallback::first_success;
use crate::normalize::{normalize, normalize_minimal, NormalizedProposal};
use crate::record::RawRecord;

/// Warning attached to a listing served by a degraded tier.
pub const DEGRADED_WARNING: &str =
    "Limited data due to database inconsistencies. Consider data cleanup.";

/// Suggestion attached to a listing that could not be served at all.
pub const CLEANUP_SUGGESTION: &str =
    "Database has inconsistent data types. Consider running data cleanup.";

/// A way of reading a page of proposals, from richest to most defensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingTier {
    /// Whole documents joined with their owner.
    Full,
    /// Individually extracted fields, no owner lookup.
    Projected,
    /// Identifier, name, client and creation time only.
    Minimal,
}

impl ListingTier {
    /// Every tier, in the order they should be tried.
    pub const ALL: [ListingTier; 3] = [ListingTier::Full, ListingTier::Projected, ListingTier::Minimal];

    /// Page size read by this tier.
    pub fn limit(self) -> i64 {
        match self {
            ListingTier::Full | ListingTier::Projected => 50,
            ListingTier::Minimal => 10,
        }
    }

    /// Short name used in logs and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ListingTier::Full => "full",
            ListingTier::Projected => "projected",
            ListingTier::Minimal => "minimal",
        }
    }

    /// Human-readable description of what the tier returned.
    pub fn note(self) -> &'static str {
        match self {
            ListingTier::Full => "Full proposal documents with owner details",
            ListingTier::Projected => "Fields extracted individually to handle mixed data types",
            ListingTier::Minimal => "Identifier, name and client only",
        }
    }

    fn normalize(self, raw: &RawRecord, index: usize) -> NormalizedProposal {
        match self {
            ListingTier::Full | ListingTier::Projected => normalize(raw, index),
            ListingTier::Minimal => normalize_minimal(raw, index),
        }
    }
}

impl fmt::Display for ListingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single tier read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A store that can read proposals at each [`ListingTier`].
#[async_trait]
pub trait ProposalSource: Send + Sync {
    /// Read up to `limit` raw records, newest first.
    async fn fetch(&self, tier: ListingTier, limit: i64) -> Result<Vec<RawRecord>, SourceError>;
}

/// A page of normalized proposals and how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub proposals: Vec<NormalizedProposal>,
    pub tier: ListingTier,
    pub limit: i64,
    pub note: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

/// Errors from [`list_proposals`].
#[derive(Debug, Error)]
pub enum ListingError {
    /// Every tier failed.
    #[error("all listing tiers failed: {}", summarize(.attempts))]
    Exhausted {
        attempts: Vec<(ListingTier, SourceError)>,
    },
}

impl ListingError {
    /// Suggestion to surface alongside the error.
    pub fn suggestion(&self) -> &'static str {
        CLEANUP_SUGGESTION
    }
}

fn summarize(attempts: &[(ListingTier, SourceError)]) -> String {
    if attempts.is_empty() {
        return "no tiers configured".to_string();
    }
    attempts
        .iter()
        .map(|(tier, err)| format!("{tier}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read a page of proposals, trying `tiers` in order.
///
/// The first tier that reads successfully is normalized and returned. A
/// listing served by any tier other than the first carries a warning.
pub async fn list_proposals<S>(source: &S, tiers: &[ListingTier]) -> Result<Listing, ListingError>
where
    S: ProposalSource + ?Sized,
{
    let outcome = first_success(tiers.iter().copied(), |tier| async move {
        let result = source.fetch(tier, tier.limit()).await;
        if let Err(ref err) = result {
            warn!(tier = %tier, error = %err, "Listing tier failed");
        }
        result
    })
    .await;

    let success = outcome.map_err(|attempts| ListingError::Exhausted { attempts })?;
    let tier = success.candidate;

    let proposals: Vec<NormalizedProposal> = success
        .value
        .iter()
        .enumerate()
        .map(|(index, raw)| tier.normalize(raw, index))
        .collect();

    info!(tier = %tier, count = proposals.len(), "Listed proposals");

    Ok(Listing {
        proposals,
        tier,
        limit: tier.limit(),
        note: tier.note(),
        warning: (success.position > 0).then_some(DEGRADED_WARNING),
    })
}
