// src/component/descriptor.rs
//! Component descriptors: identity, kind, dependency declarations and the
//! callable that produces the component's fact.

use crate::component::traits::{Component, Fact, Inputs};
use crate::component::errors::ComponentError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Identity
// ============================================================================

/// Stable, globally unique key naming a component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(Arc<str>);

impl ComponentId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&ComponentId> for ComponentId {
    fn from(id: &ComponentId) -> Self {
        id.clone()
    }
}

// ============================================================================
// Kind
// ============================================================================

/// Informational component category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Source,
    Extractor,
    Aggregator,
    Evaluator,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Extractor => "extractor",
            Self::Aggregator => "aggregator",
            Self::Evaluator => "evaluator",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "source" => Some(Self::Source),
            "extractor" => Some(Self::Extractor),
            "aggregator" => Some(Self::Aggregator),
            "evaluator" => Some(Self::Evaluator),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Alternative groups
// ============================================================================

/// One `at_least_one` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyGroup {
    /// Explicit member identities, in provider-declaration order
    Members(Vec<ComponentId>),

    /// Every registered provider of a capability, expanded at graph build
    Capability(String),
}

// ============================================================================
// Descriptor
// ============================================================================

/// Static metadata and callable for one registered component
#[derive(Clone)]
pub struct Descriptor {
    id: ComponentId,
    kind: ComponentKind,
    requires: Vec<ComponentId>,
    at_least_one: Vec<DependencyGroup>,
    optional: Vec<ComponentId>,
    provides: Vec<String>,
    enabled: bool,
    component: Arc<dyn Component>,
}

impl Descriptor {
    /// Start describing a component
    pub fn builder(id: impl Into<ComponentId>, kind: ComponentKind) -> DescriptorBuilder {
        DescriptorBuilder::new(id.into(), kind)
    }

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn requires(&self) -> &[ComponentId] {
        &self.requires
    }

    pub fn at_least_one(&self) -> &[DependencyGroup] {
        &self.at_least_one
    }

    pub fn optional(&self) -> &[ComponentId] {
        &self.optional
    }

    pub fn provides(&self) -> &[String] {
        &self.provides
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Invoke the component with resolved inputs
    pub fn invoke(&self, inputs: &Inputs) -> Result<Fact, ComponentError> {
        self.component.invoke(inputs)
    }

    /// Every identity named explicitly by this descriptor, in declaration order
    pub fn referenced_ids(&self) -> impl Iterator<Item = &ComponentId> {
        let grouped = self.at_least_one.iter().flat_map(|group| match group {
            DependencyGroup::Members(members) => members.as_slice(),
            DependencyGroup::Capability(_) => &[][..],
        });

        self.requires
            .iter()
            .chain(grouped)
            .chain(self.optional.iter())
    }

    /// Check declarations that can be judged without the rest of the registry
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("identity must not be empty".to_string());
        }

        for (index, group) in self.at_least_one.iter().enumerate() {
            match group {
                DependencyGroup::Members(members) if members.is_empty() => {
                    return Err(format!("alternative group {} has no members", index));
                }
                DependencyGroup::Capability(capability) if capability.trim().is_empty() => {
                    return Err(format!("alternative group {} names an empty capability", index));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("requires", &self.requires)
            .field("at_least_one", &self.at_least_one)
            .field("optional", &self.optional)
            .field("provides", &self.provides)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent construction of a [`Descriptor`]; finished by [`DescriptorBuilder::invoke`]
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    id: ComponentId,
    kind: ComponentKind,
    requires: Vec<ComponentId>,
    at_least_one: Vec<DependencyGroup>,
    optional: Vec<ComponentId>,
    provides: Vec<String>,
    enabled: bool,
}

impl DescriptorBuilder {
    fn new(id: ComponentId, kind: ComponentKind) -> Self {
        Self {
            id,
            kind,
            requires: Vec::new(),
            at_least_one: Vec::new(),
            optional: Vec::new(),
            provides: Vec::new(),
            enabled: true,
        }
    }

    /// Add a hard dependency. Duplicates are ignored, order is kept.
    pub fn requires(mut self, id: impl Into<ComponentId>) -> Self {
        push_unique(&mut self.requires, id.into());
        self
    }

    /// Add an alternative group over explicit providers
    pub fn at_least_one<I, T>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ComponentId>,
    {
        let mut group = Vec::new();
        for member in members {
            push_unique(&mut group, member.into());
        }
        self.at_least_one.push(DependencyGroup::Members(group));
        self
    }

    /// Add an alternative group over every provider of `capability`
    pub fn at_least_one_of_capability(mut self, capability: impl Into<String>) -> Self {
        self.at_least_one
            .push(DependencyGroup::Capability(capability.into()));
        self
    }

    /// Add a dependency whose absence does not block execution
    pub fn optional(mut self, id: impl Into<ComponentId>) -> Self {
        push_unique(&mut self.optional, id.into());
        self
    }

    /// Declare a capability this component satisfies
    pub fn provides(mut self, capability: impl Into<String>) -> Self {
        let capability = capability.into();
        if !self.provides.contains(&capability) {
            self.provides.push(capability);
        }
        self
    }

    /// Register the component without ever running it
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Attach a closure as the callable and finish the descriptor
    pub fn invoke<F>(self, invoke: F) -> Descriptor
    where
        F: Fn(&Inputs) -> Result<Fact, ComponentError> + Send + Sync + 'static,
    {
        self.component_shared(Arc::new(invoke))
    }

    /// Attach a [`Component`] implementation and finish the descriptor
    pub fn component<C>(self, component: C) -> Descriptor
    where
        C: Component + 'static,
    {
        self.component_shared(Arc::new(component))
    }

    /// Attach an already shared callable
    pub fn component_shared(self, component: Arc<dyn Component>) -> Descriptor {
        Descriptor {
            id: self.id,
            kind: self.kind,
            requires: self.requires,
            at_least_one: self.at_least_one,
            optional: self.optional,
            provides: self.provides,
            enabled: self.enabled,
            component,
        }
    }
}

fn push_unique(list: &mut Vec<ComponentId>, id: ComponentId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn constant(id: &str) -> Descriptor {
        Descriptor::builder(id, ComponentKind::Source).invoke(|_: &Inputs| Ok(json!(1)))
    }

    #[test]
    fn test_component_id_ordering_is_lexical() {
        let mut ids = vec![
            ComponentId::new("b"),
            ComponentId::new("a"),
            ComponentId::new("ab"),
        ];
        ids.sort();
        let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(names, vec!["a", "ab", "b"]);
    }

    #[test]
    fn test_builder_keeps_declaration_order_and_dedups() {
        let descriptor = Descriptor::builder("combine", ComponentKind::Aggregator)
            .requires("b")
            .requires("a")
            .requires("b")
            .at_least_one(["p2", "p1", "p2"])
            .optional("extra")
            .provides("combined")
            .provides("combined")
            .invoke(|_: &Inputs| Ok(json!(null)));

        assert_eq!(descriptor.requires(), &[ComponentId::new("b"), ComponentId::new("a")]);
        assert_eq!(
            descriptor.at_least_one(),
            &[DependencyGroup::Members(vec![
                ComponentId::new("p2"),
                ComponentId::new("p1")
            ])]
        );
        assert_eq!(descriptor.provides(), &["combined".to_string()]);
        assert!(descriptor.is_enabled());

        let referenced: Vec<&str> = descriptor.referenced_ids().map(|id| id.as_str()).collect();
        assert_eq!(referenced, vec!["b", "a", "p2", "p1", "extra"]);
    }

    #[test]
    fn test_check_leaves_self_reference_to_graph() {
        let descriptor = Descriptor::builder("loop", ComponentKind::Extractor)
            .optional("loop")
            .invoke(|_: &Inputs| Ok(json!(null)));
        assert!(descriptor.check().is_ok());
    }

    #[test]
    fn test_check_rejects_empty_group() {
        let descriptor = Descriptor::builder("empty", ComponentKind::Extractor)
            .at_least_one(Vec::<&str>::new())
            .invoke(|_: &Inputs| Ok(json!(null)));
        let reason = descriptor.check().unwrap_err();
        assert!(reason.contains("no members"));
    }

    #[test]
    fn test_disabled_flag() {
        let descriptor = Descriptor::builder("off", ComponentKind::Source)
            .disabled()
            .invoke(|_: &Inputs| Ok(json!(null)));
        assert!(!descriptor.is_enabled());
        assert!(constant("on").is_enabled());
    }

    #[test]
    fn test_kind_round_trip_names() {
        for kind in [
            ComponentKind::Source,
            ComponentKind::Extractor,
            ComponentKind::Aggregator,
            ComponentKind::Evaluator,
        ] {
            assert_eq!(ComponentKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(ComponentKind::from_str("rule"), None);
    }
}
