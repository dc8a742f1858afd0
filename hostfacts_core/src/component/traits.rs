// src/component/traits.rs
//! The invocation contract shared by every component kind.
//!
//! A component receives the already-resolved values of its dependencies as
//! [`Inputs`] and returns one [`Fact`] or a [`ComponentError`]. It never sees
//! the broker or the registry.

use crate::component::descriptor::ComponentId;
use crate::component::errors::ComponentError;
use std::sync::Arc;

/// Value produced by a component
pub type Fact = serde_json::Value;

// ============================================================================
// Component Trait
// ============================================================================

/// A unit of work invoked at most once per pass
pub trait Component: Send + Sync {
    fn invoke(&self, inputs: &Inputs) -> Result<Fact, ComponentError>;
}

impl<F> Component for F
where
    F: Fn(&Inputs) -> Result<Fact, ComponentError> + Send + Sync,
{
    fn invoke(&self, inputs: &Inputs) -> Result<Fact, ComponentError> {
        self(inputs)
    }
}

// ============================================================================
// Resolved Inputs
// ============================================================================

/// Dependency values handed to one invocation
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    required: Vec<(ComponentId, Arc<Fact>)>,
    groups: Vec<Vec<(ComponentId, Arc<Fact>)>>,
    optional: Vec<(ComponentId, Arc<Fact>)>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        required: Vec<(ComponentId, Arc<Fact>)>,
        groups: Vec<Vec<(ComponentId, Arc<Fact>)>>,
        optional: Vec<(ComponentId, Arc<Fact>)>,
    ) -> Self {
        Self {
            required,
            groups,
            optional,
        }
    }

    /// Add a required value (for invoking components outside an executor)
    pub fn with_required(mut self, id: impl Into<ComponentId>, value: Fact) -> Self {
        self.required.push((id.into(), Arc::new(value)));
        self
    }

    /// Add a resolved alternative group
    pub fn with_group<I, T>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = (T, Fact)>,
        T: Into<ComponentId>,
    {
        self.groups.push(
            members
                .into_iter()
                .map(|(id, value)| (id.into(), Arc::new(value)))
                .collect(),
        );
        self
    }

    /// Add an optional value that was present
    pub fn with_optional(mut self, id: impl Into<ComponentId>, value: Fact) -> Self {
        self.optional.push((id.into(), Arc::new(value)));
        self
    }

    /// Value of a required dependency
    pub fn require(&self, id: &str) -> Result<&Fact, ComponentError> {
        find(&self.required, id).ok_or_else(|| ComponentError::MissingInput {
            id: ComponentId::new(id),
        })
    }

    /// Value of an optional dependency, if it produced one
    pub fn optional(&self, id: &str) -> Option<&Fact> {
        find(&self.optional, id)
    }

    /// Successful members of alternative group `index`, in provider-declaration order
    pub fn group(&self, index: usize) -> &[(ComponentId, Arc<Fact>)] {
        self.groups.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Values of alternative group `index`
    pub fn group_values(&self, index: usize) -> impl Iterator<Item = &Fact> {
        self.group(index).iter().map(|(_, value)| value.as_ref())
    }

    /// Any resolved value by identity, searching required, grouped and optional inputs
    pub fn get(&self, id: &str) -> Option<&Fact> {
        find(&self.required, id)
            .or_else(|| self.groups.iter().find_map(|group| find(group, id)))
            .or_else(|| find(&self.optional, id))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of values supplied across all declarations
    pub fn len(&self) -> usize {
        self.required.len()
            + self.groups.iter().map(Vec::len).sum::<usize>()
            + self.optional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn find<'a>(values: &'a [(ComponentId, Arc<Fact>)], id: &str) -> Option<&'a Fact> {
    values
        .iter()
        .find(|(candidate, _)| candidate.as_str() == id)
        .map(|(_, value)| value.as_ref())
}
