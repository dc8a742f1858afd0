//! Result of one completed pass

use crate::broker::{Absent, Broker, Outcome, SkipReason};
use crate::component::{ComponentId, ComponentKind, Fact};
use crate::results::{HostContext, PassReport};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Every executed identity with its terminal outcome
#[derive(Debug)]
pub struct PassResult {
    pub(crate) pass_id: String,
    /// Executed identities in tier order
    pub(crate) order: Vec<(ComponentId, ComponentKind)>,
    pub(crate) broker: Broker,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) finished_at: DateTime<Utc>,
    pub(crate) duration: Duration,
}

impl PassResult {
    pub fn pass_id(&self) -> &str {
        &self.pass_id
    }

    /// `(identity, outcome)` in execution order
    pub fn outcomes(&self) -> impl Iterator<Item = (&ComponentId, &Outcome)> {
        self.order
            .iter()
            .filter_map(|(id, _)| self.broker.outcome(id.as_str()).map(|outcome| (id, outcome)))
    }

    pub fn outcome(&self, id: &str) -> Option<&Outcome> {
        self.broker.outcome(id)
    }

    pub fn get(&self, id: &str) -> Result<Arc<Fact>, Absent> {
        self.broker.get(id)
    }

    pub fn value(&self, id: &str) -> Option<&Fact> {
        self.outcome(id).and_then(Outcome::as_value)
    }

    pub fn kind(&self, id: &str) -> Option<ComponentKind> {
        self.order
            .iter()
            .find(|(candidate, _)| candidate.as_str() == id)
            .map(|(_, kind)| *kind)
    }

    /// Executed identities with their kinds, in tier order
    pub fn executed(&self) -> &[(ComponentId, ComponentKind)] {
        &self.order
    }

    pub fn elapsed(&self, id: &str) -> Option<Duration> {
        self.broker.elapsed(id)
    }

    pub fn is_seeded(&self, id: &str) -> bool {
        self.broker.is_seeded(id)
    }

    /// True when cancellation or the pass deadline left nodes undispatched
    pub fn is_cancelled(&self) -> bool {
        self.outcomes()
            .any(|(_, outcome)| matches!(outcome, Outcome::Skipped(SkipReason::Cancelled)))
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn broker(&self) -> &Broker {
        &self.broker
    }

    pub fn into_broker(self) -> Broker {
        self.broker
    }

    /// Serializable report stamped with this host's context
    pub fn report(&self) -> PassReport {
        PassReport::from_pass(self, HostContext::from_system())
    }
}
