//! Crate-level error wrapping every fallible layer

use crate::broker::BrokerError;
use crate::component::ComponentError;
use crate::config::ConfigError;
use crate::registry::RegistryError;
use crate::resolution::GraphError;

#[derive(Debug, thiserror::Error)]
pub enum HostfactsError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Component(#[from] ComponentError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}

impl HostfactsError {
    /// Startup-time errors: the registry or configuration is unusable
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::Registry(err) => err.is_configuration_error(),
            Self::Graph(_) | Self::Config(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, HostfactsError>;
