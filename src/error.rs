//! Error types for wiremap

use thiserror::Error;

/// Result type for wiremap operations
pub type Result<T> = std::result::Result<T, WiremapError>;

/// Wiremap errors
#[derive(Error, Debug)]
pub enum WiremapError {
    #[error("Component with ID {0} not found")]
    ComponentNotFound(String),

    #[error("Component not found by name: {0}")]
    ComponentNameNotFound(String),

    #[error("Component validation failed: {0}")]
    InvalidComponent(String),

    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    #[error("Invalid collection document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
