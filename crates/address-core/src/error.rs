//! Error types for the address records service
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for address record operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the address records service
#[derive(Error, Debug)]
pub enum Error {
    /// A record with the same normalized name already exists
    #[error("Address record already exists: {0}")]
    AlreadyExists(String),

    /// No record exists for the normalized name
    #[error("Address record not found: {0}")]
    NotFound(String),

    /// The store did not acknowledge the insert
    #[error("Address record creation failed: {0}")]
    CreationFailed(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Country name has no ISO code in the country table
    #[error("Country has no ISO code: {0}")]
    UnresolvableCountry(String),

    /// The directory returned no state matching the text
    #[error("State {state:?} not found in country {country:?}")]
    StateNotFound {
        /// State text as submitted
        state: String,
        /// Country name as submitted
        country: String,
    },

    /// Backing store failure
    #[error("Storage fault: {0}")]
    StorageFault(String),

    /// State directory transport or protocol failure
    #[error("State directory error: {0}")]
    Directory(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "already exists" error
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists(name.into())
    }

    /// Create a "not found" error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a creation failure error
    pub fn creation_failed(msg: impl Into<String>) -> Self {
        Self::CreationFailed(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an unresolvable country error
    pub fn unresolvable_country(country: impl Into<String>) -> Self {
        Self::UnresolvableCountry(country.into())
    }

    /// Create a state-not-found error
    pub fn state_not_found(state: impl Into<String>, country: impl Into<String>) -> Self {
        Self::StateNotFound {
            state: state.into(),
            country: country.into(),
        }
    }

    /// Create a storage fault error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageFault(msg.into())
    }

    /// Create a directory error
    pub fn directory(msg: impl Into<String>) -> Self {
        Self::Directory(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error means the server, not the caller, is at fault
    ///
    /// These errors surface as `status: "error"` envelopes rather than `fail`.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::StorageFault(_)
                | Self::Directory(_)
                | Self::Config(_)
                | Self::Io(_)
                | Self::Json(_)
                | Self::Other(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
