use crate::component::ComponentId;
use crate::registry::RegistryError;

/// Graph construction errors. Any of these prevents every pass from starting.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Circular dependency detected: {}", format_cycle(.cycle))]
    DependencyCycle { cycle: Vec<ComponentId> },

    #[error("Component '{id}' not found (referenced by '{referenced_by}')")]
    NotFound {
        id: ComponentId,
        referenced_by: ComponentId,
    },

    #[error("Unknown target component: {id}")]
    UnknownTarget { id: String },

    #[error("No provider registered for capability '{capability}' required by '{component}'")]
    UnknownCapability {
        component: ComponentId,
        capability: String,
    },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Dependency graph corrupted: {details}")]
    DependencyGraphCorrupted { details: String },
}

impl GraphError {
    /// Representative cycle, when this is a cycle error
    pub fn cycle(&self) -> Option<&[ComponentId]> {
        match self {
            Self::DependencyCycle { cycle } => Some(cycle),
            _ => None,
        }
    }
}

fn format_cycle(cycle: &[ComponentId]) -> String {
    cycle
        .iter()
        .map(ComponentId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
