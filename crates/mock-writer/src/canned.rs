//! Canned writer - replies with fixed text.

use proposal_core::{async_trait, GenerationError, TextGenerator};
use tokio::sync::Mutex;

/// A generator that always replies with the same text.
///
/// Prompts it receives are kept so tests can assert on them.
#[derive(Debug, Default)]
pub struct CannedWriter {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl CannedWriter {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl TextGenerator for CannedWriter {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().await.push(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "CannedWriter"
    }

    fn model(&self) -> &str {
        "canned"
    }
}
