//! Mock text generators for proposal generation tests.
//!
//! - `CannedWriter` - Replies with fixed text and records prompts
//! - `FailingWriter` - Always fails with a chosen error kind
//!
//! For real generation, use the `gemini-writer` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_writer::{CannedWriter, TextGenerator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_writer::GenerationError> {
//!     let writer = CannedWriter::new(r#"{"title": "Portal"}"#);
//!
//!     let text = writer.generate("Write a proposal").await?;
//!     assert_eq!(text, r#"{"title": "Portal"}"#);
//!     Ok(())
//! }
//! ```

mod canned;
mod failing;

pub use proposal_core::{async_trait, GenerationError, TextGenerator};

pub use canned::CannedWriter;
pub use failing::{FailingWriter, Failure};
