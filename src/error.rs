//! Error types for the termlens library.

use thiserror::Error;

/// Top-level error type for termlens operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Ranking was requested before any terms were ingested.
    #[error("no terms ingested; cannot rank an empty corpus")]
    EmptyCorpus,

    /// A similarity candidate has no recorded segment occurrences.
    #[error("candidate term has no recorded occurrences: {0}")]
    UnknownCandidate(String),

    /// The clustering routine failed or returned inconsistent output.
    #[error("clustering error: {0}")]
    Clustering(String),

    /// Snapshot line could not be encoded or decoded.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors during snapshot load/store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for termlens operations.
pub type Result<T> = std::result::Result<T, Error>;
