//! # hostfacts - dependency-ordered host fact collection
//!
//! Components (sources, extractors, aggregators, evaluators) are registered
//! once, ordered into tiers by their declared dependencies, and executed one
//! pass at a time. Each component writes exactly one outcome per pass into a
//! write-once broker; dependents only ever see values of earlier tiers.

pub mod broker;
pub mod component;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod registry;
pub mod resolution;
pub mod results;

pub use error::{HostfactsError, Result};

pub mod prelude {
    pub use crate::broker::{Absent, Broker, BrokerError, Failure, FailureKind, Outcome, SkipReason};
    pub use crate::component::{
        Component, ComponentError, ComponentId, ComponentKind, Descriptor, DescriptorBuilder,
        Fact, Inputs,
    };
    pub use crate::config::{ConfigError, ExecutorConfig};
    pub use crate::execution::{CancelToken, Executor, Observer, OutcomeEvent, PassResult};
    pub use crate::registry::{Registry, RegistryBuilder, RegistryError};
    pub use crate::resolution::{DependencyGraph, GraphError, GraphStats};
    pub use crate::results::{HostContext, PassReport};
    pub use crate::HostfactsError;
}
