// src/broker/store.rs
//! Write-once outcome store for a single pass

use crate::broker::error::BrokerError;
use crate::broker::outcome::{Absent, Outcome};
use crate::component::{ComponentId, Fact};
use crate::log_error;
use crate::logging::codes;
use crate::resolution::DependencyGraph;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

#[derive(Debug, Default)]
struct Slot {
    outcome: OnceLock<Outcome>,
    elapsed: OnceLock<Duration>,
}

/// Per-pass map from identity to terminal outcome
///
/// The key set is fixed at construction; each slot can be written exactly
/// once. Writers on different identities never contend.
#[derive(Debug, Default)]
pub struct Broker {
    slots: BTreeMap<ComponentId, Slot>,
    seeded: BTreeSet<ComponentId>,
}

impl Broker {
    /// Broker over an explicit identity set
    pub fn new<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ComponentId>,
    {
        Self {
            slots: ids
                .into_iter()
                .map(|id| (id.into(), Slot::default()))
                .collect(),
            seeded: BTreeSet::new(),
        }
    }

    /// Broker covering every node and external input of `graph`
    pub fn for_graph(graph: &DependencyGraph) -> Self {
        Self::new(graph.execution_order().chain(graph.externals()).cloned())
    }

    /// Store the terminal outcome for `id`
    pub fn put(&self, id: &str, outcome: Outcome) -> Result<(), BrokerError> {
        let (key, slot) = self
            .slots
            .get_key_value(id)
            .ok_or_else(|| BrokerError::NotFound { id: id.to_string() })?;

        slot.outcome.set(outcome).map_err(|_| {
            log_error!(
                codes::execution::DUPLICATE_WRITE,
                "Second write to a resolved identity",
                "component" => key
            );
            BrokerError::DuplicateWrite { id: key.clone() }
        })
    }

    /// Supply a value before the pass starts; seeded identities are never invoked
    pub fn seed(&mut self, id: &str, value: Fact) -> Result<(), BrokerError> {
        self.put(id, Outcome::value(value))?;
        self.seeded.insert(ComponentId::new(id));
        Ok(())
    }

    pub fn is_seeded(&self, id: &str) -> bool {
        self.seeded.contains(id)
    }

    /// The stored value, or why there is none
    pub fn get(&self, id: &str) -> Result<Arc<Fact>, Absent> {
        let slot = self.slots.get(id).ok_or(Absent::Unknown)?;
        match slot.outcome.get() {
            Some(Outcome::Value(value)) => Ok(Arc::clone(value)),
            Some(Outcome::Skipped(reason)) => Err(Absent::Skipped(reason.clone())),
            Some(Outcome::Failed(failure)) => Err(Absent::Failed(failure.clone())),
            None => Err(Absent::Pending),
        }
    }

    /// True iff a value is stored for `id`
    pub fn contains(&self, id: &str) -> bool {
        matches!(self.outcome(id), Some(Outcome::Value(_)))
    }

    pub fn outcome(&self, id: &str) -> Option<&Outcome> {
        self.slots.get(id).and_then(|slot| slot.outcome.get())
    }

    /// True once any terminal outcome has been written for `id`
    pub fn is_resolved(&self, id: &str) -> bool {
        self.outcome(id).is_some()
    }

    pub fn record_elapsed(&self, id: &str, elapsed: Duration) {
        if let Some(slot) = self.slots.get(id) {
            let _ = slot.elapsed.set(elapsed);
        }
    }

    pub fn elapsed(&self, id: &str) -> Option<Duration> {
        self.slots.get(id).and_then(|slot| slot.elapsed.get().copied())
    }

    /// Resolved identities with their outcomes, in identity order
    pub fn outcomes(&self) -> impl Iterator<Item = (&ComponentId, &Outcome)> {
        self.slots
            .iter()
            .filter_map(|(id, slot)| slot.outcome.get().map(|outcome| (id, outcome)))
    }

    /// True if `id` is part of this pass
    pub fn tracks(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Identities in this pass, resolved or not
    pub fn identities(&self) -> impl Iterator<Item = &ComponentId> {
        self.slots.keys()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn resolved_count(&self) -> usize {
        self.outcomes().count()
    }
}
