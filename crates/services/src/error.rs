//! Shared error types for the services crate.
//!
//! Collaborator adapters return these; the engine itself swallows them at
//! the boundary (log and degrade), so nothing here is fatal to a host.

use thiserror::Error;

/// Errors emitted by the remote data provider.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("provider request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the identity/member-field store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HydrateError {
    #[error("member store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
