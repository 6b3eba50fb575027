mod gemini;

pub use gemini::GeminiAgent;

use async_trait::async_trait;

/// Failures from the generation service. Kept as a tagged error so callers
/// branch on outcome instead of inspecting the returned text.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("generation service error ({status}): {detail}")]
    Service {
        status: reqwest::StatusCode,
        detail: String,
    },

    #[error("generation response contained no text")]
    EmptyResponse,
}

#[async_trait]
pub trait IdeaEvaluator: Send + Sync {
    /// Produces the structured analysis for one business idea.
    async fn evaluate(&self, idea: &str) -> Result<String, EvalError>;
}
