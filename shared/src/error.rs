use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssistantError>;

/// Failure kinds surfaced by the pipeline.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("provider error (status {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("agent stopped after {iterations} iterations without a final answer")]
    BudgetExceeded { iterations: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("document error: {0}")]
    Document(String),
}

impl AssistantError {
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        AssistantError::Transport(err.to_string())
    }

    pub fn document<E: std::fmt::Display>(err: E) -> Self {
        AssistantError::Document(err.to_string())
    }

    /// Transport failures, rate limits and server-side errors may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            AssistantError::Transport(_) => true,
            AssistantError::Provider { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
