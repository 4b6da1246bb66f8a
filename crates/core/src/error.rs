//! Error types for catalog loading, search, and mock auth.

use std::path::PathBuf;
use thiserror::Error;

/// Failure modes of the search pipeline.
///
/// Zero matches is not an error: it is a successful response with `total == 0`.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request body could not be read as a search query.
    #[error("malformed search request: {0}")]
    Malformed(String),
    /// Unexpected runtime fault while running the pipeline.
    #[error("internal search failure: {0}")]
    Internal(String),
}

/// Errors raised while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate dataset id '{0}'")]
    DuplicateId(String),
    #[error("dataset '{id}' has relevanceScore {score} (max 100)")]
    ScoreOutOfRange { id: String, score: u8 },
    #[error("analytics entry '{0}' does not match any dataset")]
    OrphanAnalytics(String),
}

/// Errors from the mock login/signup/profile flows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    MissingFields(&'static str),
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password must be at least 8 characters")]
    WeakPassword,
    #[error("Missing or invalid session token")]
    Unauthorized,
}
