//! Error types for the Mercator library.

use thiserror::Error;

/// Main error type for Mercator operations.
///
/// Only batch preconditions surface through this type. Failures below batch
/// scope (a column that cannot be coerced, a provider that times out, a
/// malformed record) are contained where they happen and never abort a run.
#[derive(Debug, Error)]
pub enum MercatorError {
    /// The requested marketplace has no entry in the requirement table.
    #[error("Unknown marketplace: {0}")]
    UnknownMarketplace(String),

    /// Empty input or no data to map.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A canonical record is structurally invalid.
    #[error("Invalid record '{identifier}': {message}")]
    InvalidRecord { identifier: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for Mercator operations.
pub type Result<T> = std::result::Result<T, MercatorError>;
