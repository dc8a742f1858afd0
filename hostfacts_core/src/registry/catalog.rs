// src/registry/catalog.rs
//! Component registry with capability index
//!
//! Populated once during a deterministic startup phase and read-only
//! afterwards. Graphs take an `Arc` snapshot of each descriptor, so later
//! registrations never affect a graph that has already been built.

use crate::component::{ComponentId, ComponentKind, Descriptor};
use crate::logging::codes;
use crate::log_error;
use crate::registry::error::RegistryError;
use std::collections::HashMap;
use std::sync::Arc;

/// Catalog of component descriptors keyed by identity
#[derive(Debug, Default, Clone)]
pub struct Registry {
    /// Descriptors in registration order
    descriptors: Vec<Arc<Descriptor>>,

    /// Identity -> position in `descriptors`
    index: HashMap<ComponentId, usize>,

    /// Capability -> providers in registration order
    capabilities: HashMap<String, Vec<ComponentId>>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fluent registry builder
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Register a descriptor; identities must be unique
    pub fn register(&mut self, descriptor: Descriptor) -> Result<(), RegistryError> {
        let id = descriptor.id().clone();

        if self.index.contains_key(&id) {
            log_error!(
                codes::graph::DUPLICATE_IDENTITY,
                "Component identity registered twice",
                "component" => &id
            );
            return Err(RegistryError::DuplicateIdentity { id });
        }

        descriptor
            .check()
            .map_err(|reason| RegistryError::InvalidDescriptor {
                id: id.clone(),
                reason,
            })?;

        for capability in descriptor.provides() {
            self.capabilities
                .entry(capability.clone())
                .or_default()
                .push(id.clone());
        }

        self.index.insert(id, self.descriptors.len());
        self.descriptors.push(Arc::new(descriptor));

        Ok(())
    }

    /// Get descriptor by identity
    pub fn lookup(&self, id: &str) -> Result<&Arc<Descriptor>, RegistryError> {
        self.index
            .get(id)
            .map(|&position| &self.descriptors[position])
            .ok_or_else(|| RegistryError::NotFound { id: id.to_string() })
    }

    /// All descriptors in registration order. The iterator is cheap to clone,
    /// so it can be restarted.
    pub fn all(&self) -> std::slice::Iter<'_, Arc<Descriptor>> {
        self.descriptors.iter()
    }

    /// Identities that provide `capability`, in registration order
    pub fn providers_of(&self, capability: &str) -> &[ComponentId] {
        self.capabilities
            .get(capability)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check if identity is registered
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// List all registered capabilities, sorted
    pub fn capabilities(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.capabilities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get registry statistics
    pub fn get_statistics(&self) -> RegistryStatistics {
        let count = |kind: ComponentKind| self.all().filter(|d| d.kind() == kind).count();

        RegistryStatistics {
            total_components: self.len(),
            sources: count(ComponentKind::Source),
            extractors: count(ComponentKind::Extractor),
            aggregators: count(ComponentKind::Aggregator),
            evaluators: count(ComponentKind::Evaluator),
            disabled: self.all().filter(|d| !d.is_enabled()).count(),
            capabilities: self.capabilities.len(),
        }
    }
}

// ============================================================================
// Supporting Data Structures
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStatistics {
    pub total_components: usize,
    pub sources: usize,
    pub extractors: usize,
    pub aggregators: usize,
    pub evaluators: usize,
    pub disabled: usize,
    pub capabilities: usize,
}

// ============================================================================
// Registry Builder
// ============================================================================

/// Builder collecting descriptors during startup
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    pub fn register(mut self, descriptor: Descriptor) -> Result<Self, RegistryError> {
        self.registry.register(descriptor)?;
        Ok(self)
    }

    /// Register a batch of descriptors, stopping at the first error
    pub fn register_all<I>(mut self, descriptors: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Descriptor>,
    {
        for descriptor in descriptors {
            self.registry.register(descriptor)?;
        }
        Ok(self)
    }

    pub fn build(self) -> Registry {
        self.registry
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Inputs;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn source(id: &str) -> Descriptor {
        Descriptor::builder(id, ComponentKind::Source).invoke(|_: &Inputs| Ok(json!(1)))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        registry.register(source("hostname")).unwrap();

        let descriptor = registry.lookup("hostname").unwrap();
        assert_eq!(descriptor.id().as_str(), "hostname");
        assert!(registry.contains("hostname"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let mut registry = Registry::new();
        registry.register(source("x")).unwrap();

        let err = registry.register(source("x")).unwrap_err();
        assert_matches!(err, RegistryError::DuplicateIdentity { ref id } if id.as_str() == "x");
        assert!(err.is_configuration_error());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_not_found() {
        let registry = Registry::new();
        assert_matches!(
            registry.lookup("missing"),
            Err(RegistryError::NotFound { id }) if id == "missing"
        );
    }

    #[test]
    fn test_invalid_descriptor_rejected() {
        let mut registry = Registry::new();
        let empty_group = Descriptor::builder("pick", ComponentKind::Extractor)
            .at_least_one(Vec::<&str>::new())
            .invoke(|_: &Inputs| Ok(json!(null)));

        assert_matches!(
            registry.register(empty_group),
            Err(RegistryError::InvalidDescriptor { .. })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_all_is_ordered_and_restartable() {
        let registry = RegistryBuilder::new()
            .register_all(["zeta", "alpha", "mid"].into_iter().map(source))
            .unwrap()
            .build();

        let iter = registry.all();
        let first: Vec<&str> = iter.clone().map(|d| d.id().as_str()).collect();
        let second: Vec<&str> = iter.map(|d| d.id().as_str()).collect();
        assert_eq!(first, vec!["zeta", "alpha", "mid"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_capability_index() {
        let registry = RegistryBuilder::new()
            .register(
                Descriptor::builder("uname_r", ComponentKind::Source)
                    .provides("kernel_release")
                    .invoke(|_: &Inputs| Ok(json!("5.14"))),
            )
            .unwrap()
            .register(
                Descriptor::builder("proc_osrelease", ComponentKind::Source)
                    .provides("kernel_release")
                    .invoke(|_: &Inputs| Ok(json!("5.14"))),
            )
            .unwrap()
            .build();

        let providers: Vec<&str> = registry
            .providers_of("kernel_release")
            .iter()
            .map(|id| id.as_str())
            .collect();
        assert_eq!(providers, vec!["uname_r", "proc_osrelease"]);
        assert!(registry.providers_of("selinux_mode").is_empty());
        assert_eq!(registry.capabilities(), vec!["kernel_release"]);
    }

    #[test]
    fn test_statistics() {
        let registry = RegistryBuilder::new()
            .register(source("a"))
            .unwrap()
            .register(
                Descriptor::builder("rule", ComponentKind::Evaluator)
                    .requires("a")
                    .disabled()
                    .invoke(|_: &Inputs| Ok(json!(true))),
            )
            .unwrap()
            .build();

        let stats = registry.get_statistics();
        assert_eq!(stats.total_components, 2);
        assert_eq!(stats.sources, 1);
        assert_eq!(stats.evaluators, 1);
        assert_eq!(stats.disabled, 1);
    }
}
