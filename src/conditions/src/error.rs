//! Error types for condition loading
//!
//! Evaluation itself never fails; these errors only surface while building
//! evaluators, compiling policies or reading configuration.

use thiserror::Error;

/// Condition engine errors
#[derive(Debug, Error)]
pub enum ConditionError {
    /// No evaluator registered for a condition kind
    #[error("Unknown condition kind: {0}")]
    UnknownConditionKind(String),

    /// Invalid policy definition
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration parse error
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON document parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for condition operations
pub type Result<T> = std::result::Result<T, ConditionError>;
