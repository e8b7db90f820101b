//! Google Gemini text generator.
//!
//! Implements [`TextGenerator`] on top of the Gemini `generateContent` REST
//! endpoint, for use by the proposal generation and autofill pipelines.
//!
//! ```rust,no_run
//! use gemini_writer::{GeminiWriter, TextGenerator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let writer = GeminiWriter::from_env()?;
//!     let text = writer.generate("Summarize this brief").await?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```

mod api_types;
mod config;
mod writer;

pub use config::{GeminiWriterConfig, GeminiWriterConfigBuilder};
pub use writer::GeminiWriter;

pub use proposal_core::{async_trait, GenerationError, TextGenerator};
