//! Outcome observers notified after every broker write

use crate::broker::Outcome;
use crate::component::{ComponentId, ComponentKind};
use std::sync::Arc;
use std::time::Duration;

/// One terminal outcome as seen by observers
#[derive(Debug, Clone, Copy)]
pub struct OutcomeEvent<'a> {
    pub pass_id: &'a str,
    pub id: &'a ComponentId,
    pub kind: ComponentKind,
    pub outcome: &'a Outcome,
    pub elapsed: Duration,
}

/// Receives outcomes as they are written
///
/// Called from worker threads, possibly concurrently. A panicking observer
/// is logged and otherwise ignored.
pub trait Observer: Send + Sync {
    fn on_outcome(&self, event: &OutcomeEvent<'_>);
}

impl<F> Observer for F
where
    F: Fn(&OutcomeEvent<'_>) + Send + Sync,
{
    fn on_outcome(&self, event: &OutcomeEvent<'_>) {
        self(event)
    }
}

/// Observer with an optional kind filter
#[derive(Clone)]
pub(crate) struct Subscription {
    pub(crate) kind: Option<ComponentKind>,
    pub(crate) observer: Arc<dyn Observer>,
}

impl Subscription {
    pub(crate) fn accepts(&self, kind: ComponentKind) -> bool {
        self.kind.map_or(true, |wanted| wanted == kind)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
