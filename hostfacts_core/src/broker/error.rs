use crate::component::ComponentId;

/// Broker misuse. Both variants indicate a programming error, not a
/// component failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    #[error("Outcome for '{id}' already written in this pass")]
    DuplicateWrite { id: ComponentId },

    #[error("Identity '{id}' is not part of this pass")]
    NotFound { id: String },
}
