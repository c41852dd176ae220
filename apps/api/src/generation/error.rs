use serde::Serialize;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Coarse classification of a generation failure, stable for callers that only
/// need to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationErrorKind {
    InvalidRequest,
    UpstreamUnavailable,
    NoValidPairs,
    InsufficientPairs,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Rejected before any network call.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network failure, timeout or non-success response. Retryable.
    #[error("upstream generator unavailable: {0}")]
    UpstreamUnavailable(#[source] LlmError),

    /// The upstream answered but nothing survived validation. Retrying the same
    /// category is unlikely to help.
    #[error("no valid word pairs were generated, try a different category")]
    NoValidPairs,

    /// Only raised under `PairCountPolicy::Exact`.
    #[error("only {produced} of {requested} requested word pairs were usable")]
    InsufficientPairs { requested: usize, produced: usize },
}

impl GenerationError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            GenerationError::InvalidRequest(_) => GenerationErrorKind::InvalidRequest,
            GenerationError::UpstreamUnavailable(_) => GenerationErrorKind::UpstreamUnavailable,
            GenerationError::NoValidPairs => GenerationErrorKind::NoValidPairs,
            GenerationError::InsufficientPairs { .. } => GenerationErrorKind::InsufficientPairs,
        }
    }

    /// Whether the same request may succeed if simply retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::UpstreamUnavailable(_))
    }
}
