//! Error types for pointer session operations.

use thiserror::Error;

/// Result type for pointer session operations.
pub type InputResult<T> = Result<T, InputError>;

/// Errors that can occur constructing or configuring sessions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    /// Invalid argument provided to a session constructor.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
