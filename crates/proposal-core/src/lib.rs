//! Core types and pipelines for Propulso proposals.
//!
//! This crate holds the logic that sits between the HTTP layer and the
//! stores it talks to:
//!
//! - [`RawRecord`] / [`normalize`] - Coerce loosely-typed stored proposals
//!   into a [`NormalizedProposal`] that is always safe to serialize
//! - [`list_proposals`] - Run an ordered list of [`ListingTier`]s against a
//!   [`ProposalSource`] and serve the first one that works
//! - [`resolve_owner`] - Decide which user owns a new proposal by running
//!   [`AttributionStrategy`]s against a [`UserDirectory`]
//! - [`TextGenerator`] / [`generate_proposal`] - Ask an AI text service for a
//!   structured proposal, falling back locally when it misbehaves
//!
//! # Example
//!
//! ```rust
//! use proposal_core::{normalize, RawRecord};
//! use serde_json::json;
//!
//! let raw = RawRecord::from_value(json!({
//!     "name": "Proj",
//!     "techStack": "[\"React\",\"Node\"]"
//! }))
//! .unwrap();
//!
//! let view = normalize(&raw, 0);
//! assert_eq!(view.tech_stack, vec!["React", "Node"]);
//! assert_eq!(view.client_name, "Unknown Client");
//! ```

pub mod attribution;
pub mod fallback;
pub mod generation;
pub mod listing;
pub mod normalize;
mod prompt;
pub mod record;

pub use attribution::{
    resolve_owner, Attribution, AttributionError, AttributionPolicy, AttributionRequest,
    AttributionStrategy, DirectoryError, UserDirectory,
};
pub use fallback::{first_success, Success};
pub use generation::{
    autofill, generate_proposal, merge_autofill, parse_generated, AutofillError,
    GeneratedProposal, GenerationError, GenerationSource, TextGenerator,
};
pub use listing::{list_proposals, Listing, ListingError, ListingTier, ProposalSource, SourceError};
pub use normalize::{normalize, normalize_minimal, normalize_simple, NormalizedProposal, ProposalOwner};
pub use prompt::{autofill_prompt, proposal_prompt};
pub use record::RawRecord;

// Re-export async_trait for implementors
pub use async_trait::async_trait;
