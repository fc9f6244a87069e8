use thiserror::Error;

use crate::application::repos::RepoError;
use crate::application::upstream::UpstreamError;

/// What a cache lookup can fail with, as seen by callers.
///
/// `Configuration` is kept apart from `Upstream` so a missing credential can
/// fail fast and loudly; everything else collapses into one retrieval
/// failure at the HTTP boundary.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Required upstream credential absent; no network call was attempted.
    #[error("recipe api credential is not configured")]
    Configuration,
    #[error(transparent)]
    Upstream(UpstreamError),
    #[error(transparent)]
    Store(#[from] RepoError),
    #[error("cache payload codec failure: {0}")]
    Codec(String),
}

impl From<UpstreamError> for RetrievalError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::MissingCredential => Self::Configuration,
            other => Self::Upstream(other),
        }
    }
}

/// Top-level error for the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] crate::infra::error::InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
