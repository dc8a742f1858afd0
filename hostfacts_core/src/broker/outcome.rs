//! Terminal outcomes of a component within one pass

use crate::component::{ComponentId, Fact};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Terminal state of one identity in one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Value(Arc<Fact>),
    Skipped(SkipReason),
    Failed(Failure),
}

impl Outcome {
    pub fn value(fact: Fact) -> Self {
        Self::Value(Arc::new(fact))
    }

    pub fn skipped(reason: SkipReason) -> Self {
        Self::Skipped(reason)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The produced fact, if any
    pub fn as_value(&self) -> Option<&Fact> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn status_str(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "value: {}", value),
            Self::Skipped(reason) => write!(f, "skipped: {}", reason),
            Self::Failed(failure) => write!(f, "failed: {}", failure.message),
        }
    }
}

/// Why a component was not invoked or declined to produce a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// First `requires` identity, in declaration order, without a value
    MissingRequired { id: ComponentId },
    /// Alternative group with no member holding a value
    UnsatisfiedGroup {
        index: usize,
        members: Vec<ComponentId>,
    },
    /// The component itself returned a skip
    Declined { message: String },
    Disabled,
    Cancelled,
}

impl SkipReason {
    pub fn missing_required(id: impl Into<ComponentId>) -> Self {
        Self::MissingRequired { id: id.into() }
    }

    pub fn declined(message: impl Into<String>) -> Self {
        Self::Declined {
            message: message.into(),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired { id } => write!(f, "missing required dependency: {}", id),
            Self::UnsatisfiedGroup { .. } => f.write_str("unsatisfied alternative group"),
            Self::Declined { message } => f.write_str(message),
            Self::Disabled => f.write_str("component disabled"),
            Self::Cancelled => f.write_str("pass cancelled before dispatch"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The component returned an error
    Error,
    /// The component panicked
    Panic,
}

/// Failure cause attributed to the originating identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub component: ComponentId,
    pub kind: FailureKind,
    /// Error kind as reported by the component, e.g. `io` or `content`
    pub error_kind: Option<String>,
    pub message: String,
}

impl Failure {
    pub fn error(
        component: impl Into<ComponentId>,
        error_kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            kind: FailureKind::Error,
            error_kind: Some(error_kind.into()),
            message: message.into(),
        }
    }

    pub fn panic(component: impl Into<ComponentId>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            kind: FailureKind::Panic,
            error_kind: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Error => write!(f, "'{}' failed: {}", self.component, self.message),
            FailureKind::Panic => write!(f, "'{}' panicked: {}", self.component, self.message),
        }
    }
}

/// Typed absence returned by [`Broker::get`](super::Broker::get)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Absent {
    #[error("skipped: {0}")]
    Skipped(SkipReason),

    #[error("{0}")]
    Failed(Failure),

    #[error("not yet resolved")]
    Pending,

    #[error("identity is not part of this pass")]
    Unknown,
}
