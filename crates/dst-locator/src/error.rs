//! Error types for dst-locator operations.

use thiserror::Error;

/// Errors returned by the locator.
///
/// Note that "no transition within the horizon" is not an error: the locator
/// reports it as `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Search invariant violated: {0}")]
    SearchInvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, LocatorError>;
