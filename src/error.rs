//! Error types for the context engine.
//!

use thiserror::Error;

use crate::interrupt::SuspensionKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Context error: {0}")]
    ContextError(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Dispatch error: {0}")]
    DispatchError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Store error: {0}")]
    StoreError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(error: serde_json::Error) -> Self {
        EngineError::ValidationError(format!("JSON serialization error: {error}"))
    }
}

pub type EngineResult<T> = anyhow::Result<T, EngineError>;

/// Errors raised while deriving or querying an execution context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("Frame with runtime id {runtime_id} already present in run {run_id}")]
    DuplicateRuntimeId { run_id: String, runtime_id: String },

    #[error("Execution context for run {run_id} has no frames")]
    EmptyContext { run_id: String },

    #[error("Invalid frame: {reason}")]
    InvalidFrame { reason: String },
}

/// Errors raised while building an interrupt from a suspension response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The node delegated execution to descendants; the interrupt must target them instead
    #[error("Suspension mode {mode} cannot be the direct target of an interrupt; target its descendants")]
    InvalidSuspensionMode { mode: SuspensionKind },
}

impl From<ContextError> for EngineError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::EmptyContext { .. } => EngineError::InvalidRequest(format!("{err}")),
            _ => EngineError::ContextError(format!("{err}")),
        }
    }
}

impl From<DispatchError> for EngineError {
    fn from(err: DispatchError) -> Self {
        EngineError::DispatchError(format!("{err}"))
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::ConfigurationError(format!("{err}"))
    }
}
