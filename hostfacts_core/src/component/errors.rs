// src/component/errors.rs
//! Errors a component may return from `invoke`

use crate::component::descriptor::ComponentId;

/// Component invocation errors
///
/// [`ComponentError::Skip`] is the benign-absence signal: the executor records
/// the component as skipped. Every other variant is recorded as a failure.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("{reason}")]
    Skip { reason: String },

    #[error("Required input '{id}' was not supplied")]
    MissingInput { id: ComponentId },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Content error: {reason}")]
    Content { reason: String },

    #[error("{message}")]
    Failed { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ComponentError {
    /// Benign absence: not applicable on this host
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Skip {
            reason: reason.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn content(reason: impl Into<String>) -> Self {
        Self::Content {
            reason: reason.into(),
        }
    }

    /// Check if this error is the benign-absence signal
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip { .. })
    }

    /// Short classification used in failure records
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Skip { .. } => "skip",
            Self::MissingInput { .. } => "missing_input",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Content { .. } => "content",
            Self::Failed { .. } => "failed",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}
