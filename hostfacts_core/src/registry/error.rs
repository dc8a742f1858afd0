// src/registry/error.rs
use crate::component::ComponentId;

/// Registry population and lookup errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate component identity: {id}")]
    DuplicateIdentity { id: ComponentId },

    #[error("Component not found: {id}")]
    NotFound { id: String },

    #[error("Invalid descriptor for '{id}': {reason}")]
    InvalidDescriptor { id: ComponentId, reason: String },
}

impl RegistryError {
    /// Configuration errors are fatal to building any graph
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateIdentity { .. } | Self::InvalidDescriptor { .. }
        )
    }
}
