//! Error types for coupling core operations.

use thiserror::Error;

/// Result type for coupling core operations.
pub type CouplingResult<T> = Result<T, CouplingError>;

/// Errors that can occur constructing coupling configuration.
///
/// Nothing in the running lifecycle is fatal: input misses are diagnostics,
/// missing collaborators degrade, and out-of-tolerance releases are normal
/// outcomes. Only construction-time validation can fail.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CouplingError {
    /// Invalid argument provided to a constructor.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
