//! Error types for the terrain navigation core.

use thiserror::Error;

/// Result type alias using [`NavError`].
pub type Result<T> = std::result::Result<T, NavError>;

/// Top-level error type for the navigation core.
///
/// Path and obstacle queries never fail; they degrade to empty results.
/// Errors occur only at the data-loading edge.
#[derive(Debug, Error)]
pub enum NavError {
    /// Failed to parse a land-rules data file.
    #[error("Failed to parse rules data: {0}")]
    RulesParse(String),
}
