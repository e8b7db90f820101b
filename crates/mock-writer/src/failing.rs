//! Failing writer - always errors.

use proposal_core::{async_trait, GenerationError, TextGenerator};

/// Which error a [`FailingWriter`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Unauthorized,
    RateLimited,
    Network,
    ProcessingFailed,
}

/// A generator that fails every request.
#[derive(Debug, Clone, Copy)]
pub struct FailingWriter {
    failure: Failure,
}

impl FailingWriter {
    pub fn new(failure: Failure) -> Self {
        Self { failure }
    }
}

#[async_trait]
impl TextGenerator for FailingWriter {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        let message = "simulated failure".to_string();
        Err(match self.failure {
            Failure::Unauthorized => GenerationError::Unauthorized(message),
            Failure::RateLimited => GenerationError::RateLimited(message),
            Failure::Network => GenerationError::Network(message),
            Failure::ProcessingFailed => GenerationError::ProcessingFailed(message),
        })
    }

    fn name(&self) -> &str {
        "FailingWriter"
    }

    fn model(&self) -> &str {
        "failing"
    }
}
