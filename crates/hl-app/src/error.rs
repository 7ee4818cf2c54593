//! Error types for the hl-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the core crates and
/// provides a unified interface for the CLI (and any future GUI).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Failed to read scenario file: {path}")]
    ScenarioFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hl-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from core error types
impl From<hl_core::HlError> for AppError {
    fn from(err: hl_core::HlError) -> Self {
        AppError::Scenario(err.to_string())
    }
}

impl From<hl_input::InputError> for AppError {
    fn from(err: hl_input::InputError) -> Self {
        AppError::Scenario(err.to_string())
    }
}

impl From<hl_coupling::CouplingError> for AppError {
    fn from(err: hl_coupling::CouplingError) -> Self {
        AppError::Scenario(err.to_string())
    }
}
