//! The external layout oracle
//!
//! The oracle is consumed as text in, text out. Its answer is untrusted and
//! goes through [`crate::response`] before anything else reads it.

pub mod gemini;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiOracle;

/// Any failure to obtain an answer from the oracle
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("oracle returned an empty response")]
    EmptyResponse,

    #[error("oracle did not answer within {0:?}")]
    Timeout(Duration),

    #[error("no API key configured (set it in the config file or ${env})")]
    MissingApiKey { env: String },

    #[error("malformed oracle reply: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait LayoutOracle: Send + Sync {
    /// Send one prompt and return the raw answer text
    async fn suggest(&self, prompt: &str) -> Result<String, OracleError>;
}

/// An oracle that always answers with the same text.
///
/// Used to replay a captured response.
#[derive(Debug, Clone)]
pub struct StaticOracle {
    response: String,
}

impl StaticOracle {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl LayoutOracle for StaticOracle {
    async fn suggest(&self, _prompt: &str) -> Result<String, OracleError> {
        if self.response.trim().is_empty() {
            return Err(OracleError::EmptyResponse);
        }
        Ok(self.response.clone())
    }
}
