// src/execution/executor.rs
//! Tier-sequential, node-parallel pass execution
//!
//! Each tier is split into contiguous chunks, one per worker thread, and the
//! next tier starts only after every worker of the current tier has joined.
//! Nodes never wait on each other inside a tier, so a panicking or slow node
//! only affects its own outcome.

use crate::broker::{Broker, BrokerError, Failure, FailureKind, Outcome, SkipReason};
use crate::component::{ComponentId, ComponentKind, Fact, Inputs};
use crate::config::ExecutorConfig;
use crate::execution::cancel::CancelToken;
use crate::execution::observer::{Observer, OutcomeEvent, Subscription};
use crate::execution::pass::PassResult;
use crate::logging::codes;
use crate::registry::Registry;
use crate::resolution::{DependencyGraph, GraphError, GraphNode};
use crate::{log_debug, log_error, log_info, log_warning};
use chrono::Utc;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Runs passes over a shared dependency graph
#[derive(Debug, Clone)]
pub struct Executor {
    graph: Arc<DependencyGraph>,
    config: ExecutorConfig,
    observers: Vec<Subscription>,
}

impl Executor {
    pub fn new(graph: impl Into<Arc<DependencyGraph>>) -> Self {
        Self {
            graph: graph.into(),
            config: ExecutorConfig::default(),
            observers: Vec::new(),
        }
    }

    /// Build the graph from `registry` honoring `config.strict_references`
    pub fn from_registry(registry: &Registry, config: ExecutorConfig) -> Result<Self, GraphError> {
        let graph = DependencyGraph::builder(registry)
            .strict_references(config.strict_references)
            .build()?;
        Ok(Self::new(graph).with_config(config))
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Notify `observer` of every outcome
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.add_observer(observer);
        self
    }

    pub fn add_observer(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Subscription {
            kind: None,
            observer: Arc::new(observer),
        });
    }

    /// Notify `observer` only of outcomes of components of `kind`
    pub fn add_observer_for(
        &mut self,
        kind: ComponentKind,
        observer: impl Observer + 'static,
    ) {
        self.observers.push(Subscription {
            kind: Some(kind),
            observer: Arc::new(observer),
        });
    }

    pub fn graph(&self) -> &Arc<DependencyGraph> {
        &self.graph
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run one pass over the whole graph with a fresh broker
    pub fn run(&self) -> PassResult {
        self.execute(&self.graph, Broker::for_graph(&self.graph), &CancelToken::new())
    }

    /// Run one pass after seeding external or precomputed values
    pub fn run_seeded<I, T>(&self, seeds: I) -> Result<PassResult, BrokerError>
    where
        I: IntoIterator<Item = (T, Fact)>,
        T: AsRef<str>,
    {
        let broker = seeded_broker(&self.graph, seeds)?;
        Ok(self.execute(&self.graph, broker, &CancelToken::new()))
    }

    /// Run one pass into a caller-prepared broker, observing `cancel`
    ///
    /// The broker must cover every node of the graph.
    pub fn run_with(&self, broker: Broker, cancel: &CancelToken) -> Result<PassResult, BrokerError> {
        if let Some(missing) = self
            .graph
            .execution_order()
            .find(|id| !broker.tracks(id.as_str()))
        {
            return Err(BrokerError::NotFound {
                id: missing.to_string(),
            });
        }
        Ok(self.execute(&self.graph, broker, cancel))
    }

    /// Run only `targets` and their upstream closure
    pub fn run_targets<I, T>(&self, targets: I) -> Result<PassResult, GraphError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let subgraph = self.graph.subgraph(targets)?;
        let broker = Broker::for_graph(&subgraph);
        Ok(self.execute(&subgraph, broker, &CancelToken::new()))
    }

    /// Evaluate several seed sets concurrently, one broker per pass
    ///
    /// Results are returned in input order.
    pub fn run_many<I, S, T>(&self, seed_sets: I) -> Vec<Result<PassResult, BrokerError>>
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = (T, Fact)>,
        T: AsRef<str>,
    {
        let brokers: Vec<Result<Broker, BrokerError>> = seed_sets
            .into_iter()
            .map(|seeds| seeded_broker(&self.graph, seeds))
            .collect();

        if brokers.is_empty() {
            return Vec::new();
        }

        let threads = self.config.max_threads.clamp(1, brokers.len());
        let per_thread = (brokers.len() + threads - 1) / threads;

        log_info!(
            "Starting batch of passes",
            "passes" => brokers.len(),
            "threads" => threads
        );

        let mut batches = Vec::with_capacity(threads);
        let mut remaining = brokers;
        while !remaining.is_empty() {
            let rest = remaining.split_off(per_thread.min(remaining.len()));
            batches.push(remaining);
            remaining = rest;
        }

        thread::scope(|scope| {
            let handles: Vec<_> = batches
                .into_iter()
                .map(|batch| {
                    scope.spawn(move || {
                        batch
                            .into_iter()
                            .map(|broker| {
                                broker.map(|broker| {
                                    self.execute(&self.graph, broker, &CancelToken::new())
                                })
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| panic::resume_unwind(payload))
                })
                .collect()
        })
    }

    // ------------------------------------------------------------------------
    // Pass internals
    // ------------------------------------------------------------------------

    fn execute(&self, graph: &DependencyGraph, broker: Broker, cancel: &CancelToken) -> PassResult {
        let pass_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let clock = Instant::now();
        let deadline = self.config.pass_timeout().map(|timeout| clock + timeout);

        log_info!(
            "Pass started",
            "pass_id" => &pass_id,
            "components" => graph.len(),
            "tiers" => graph.tiers().len(),
            "threads" => self.config.max_threads
        );

        let pass = Pass {
            executor: self,
            graph,
            broker: &broker,
            cancel,
            deadline,
            pass_id: &pass_id,
        };

        let mut cancelled = false;
        for (index, tier) in graph.tiers().iter().enumerate() {
            if !cancelled && pass.should_stop() {
                cancelled = true;
                log_warning!(
                    code = codes::execution::PASS_CANCELLED,
                    "Pass cancelled; remaining components not dispatched",
                    "pass_id" => &pass_id,
                    "next_tier" => index,
                    "elapsed_ms" => clock.elapsed().as_millis()
                );
            }

            if cancelled {
                for id in tier {
                    pass.settle(id, Outcome::Skipped(SkipReason::Cancelled), Duration::ZERO);
                }
                continue;
            }

            log_debug!(
                "Dispatching tier",
                "pass_id" => &pass_id,
                "tier" => index,
                "width" => tier.len()
            );
            pass.run_tier(tier);
        }

        let duration = clock.elapsed();
        let order = graph
            .execution_order()
            .filter_map(|id| graph.node(id.as_str()).map(|node| (id.clone(), node.kind())))
            .collect();

        let result = PassResult {
            pass_id,
            order,
            broker,
            started_at,
            finished_at: Utc::now(),
            duration,
        };

        let (values, skipped, failed) = result.outcomes().fold((0, 0, 0), |(v, s, f), (_, o)| {
            match o {
                Outcome::Value(_) => (v + 1, s, f),
                Outcome::Skipped(_) => (v, s + 1, f),
                Outcome::Failed(_) => (v, s, f + 1),
            }
        });
        log_info!(
            "Pass finished",
            "pass_id" => result.pass_id(),
            "values" => values,
            "skipped" => skipped,
            "failed" => failed,
            "duration_ms" => duration.as_millis()
        );

        result
    }
}

/// Per-pass execution state shared by worker threads
struct Pass<'a> {
    executor: &'a Executor,
    graph: &'a DependencyGraph,
    broker: &'a Broker,
    cancel: &'a CancelToken,
    deadline: Option<Instant>,
    pass_id: &'a str,
}

impl Pass<'_> {
    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled()
            || self
                .deadline
                .map_or(false, |deadline| Instant::now() >= deadline)
    }

    fn run_tier(&self, tier: &[ComponentId]) {
        let threads = self.executor.config.max_threads.clamp(1, tier.len().max(1));

        if threads == 1 {
            for id in tier {
                self.run_node(id);
            }
            return;
        }

        let per_thread = (tier.len() + threads - 1) / threads;

        thread::scope(|scope| {
            let workers: Vec<_> = tier
                .chunks(per_thread)
                .map(|chunk| {
                    let handle = scope.spawn(move || {
                        for id in chunk {
                            self.run_node(id);
                        }
                    });
                    (chunk, handle)
                })
                .collect();

            for (chunk, handle) in workers {
                if let Err(payload) = handle.join() {
                    if !self.executor.config.catch_panics {
                        panic::resume_unwind(payload);
                    }
                    let message = panic_message(payload.as_ref());
                    log_error!(
                        codes::execution::WORKER_PANICKED,
                        "Worker thread panicked",
                        "pass_id" => self.pass_id,
                        "error" => &message
                    );
                    for id in chunk {
                        self.settle(
                            id,
                            Outcome::Failed(Failure::panic(id, message.clone())),
                            Duration::ZERO,
                        );
                    }
                }
            }
        });
    }

    fn run_node(&self, id: &ComponentId) {
        if self.broker.is_resolved(id.as_str()) {
            log_debug!("Component pre-seeded, not invoked", "component" => id);
            return;
        }

        let Some(node) = self.graph.node(id.as_str()) else {
            return;
        };

        let started = Instant::now();
        let outcome = if self.should_stop() {
            Outcome::Skipped(SkipReason::Cancelled)
        } else {
            self.evaluate(node)
        };
        self.settle(id, outcome, started.elapsed());
    }

    /// Resolve inputs and invoke, or decide not to
    fn evaluate(&self, node: &GraphNode) -> Outcome {
        let id = node.id();

        if !node.descriptor().is_enabled() || self.executor.config.is_disabled(id.as_str()) {
            return Outcome::Skipped(SkipReason::Disabled);
        }

        let mut required = Vec::with_capacity(node.requires().len());
        for dependency in node.requires() {
            match self.broker.get(dependency.as_str()) {
                Ok(value) => required.push((dependency.clone(), value)),
                Err(_) => return Outcome::Skipped(SkipReason::missing_required(dependency)),
            }
        }

        let mut groups = Vec::with_capacity(node.groups().len());
        for (index, members) in node.groups().iter().enumerate() {
            let present: Vec<(ComponentId, Arc<Fact>)> = members
                .iter()
                .filter_map(|member| {
                    self.broker
                        .get(member.as_str())
                        .ok()
                        .map(|value| (member.clone(), value))
                })
                .collect();

            if present.is_empty() {
                return Outcome::Skipped(SkipReason::UnsatisfiedGroup {
                    index,
                    members: members.clone(),
                });
            }
            groups.push(present);
        }

        let optional = node
            .optional()
            .iter()
            .filter_map(|dependency| {
                self.broker
                    .get(dependency.as_str())
                    .ok()
                    .map(|value| (dependency.clone(), value))
            })
            .collect();

        let inputs = Inputs::from_parts(required, groups, optional);
        self.invoke(node, &inputs)
    }

    fn invoke(&self, node: &GraphNode, inputs: &Inputs) -> Outcome {
        let id = node.id();
        let descriptor = node.descriptor();

        let result = if self.executor.config.catch_panics {
            match panic::catch_unwind(AssertUnwindSafe(|| descriptor.invoke(inputs))) {
                Ok(result) => result,
                Err(payload) => {
                    return Outcome::Failed(Failure::panic(id, panic_message(payload.as_ref())))
                }
            }
        } else {
            descriptor.invoke(inputs)
        };

        match result {
            Ok(value) => Outcome::value(value),
            Err(err) if err.is_skip() => Outcome::Skipped(SkipReason::declined(err.to_string())),
            Err(err) => Outcome::Failed(Failure::error(id, err.kind_str(), err.to_string())),
        }
    }

    /// Write the terminal outcome, log it and notify observers
    fn settle(&self, id: &ComponentId, outcome: Outcome, elapsed: Duration) {
        if self.broker.is_resolved(id.as_str()) {
            return;
        }

        if self.broker.put(id.as_str(), outcome).is_err() {
            return;
        }
        self.broker.record_elapsed(id.as_str(), elapsed);

        let Some(outcome) = self.broker.outcome(id.as_str()) else {
            return;
        };

        match outcome {
            Outcome::Value(_) => {
                log_debug!(
                    "Component produced a value",
                    "component" => id,
                    "elapsed_us" => elapsed.as_micros()
                );
            }
            Outcome::Skipped(reason) => {
                log_debug!("Component skipped", "component" => id, "reason" => reason);
            }
            Outcome::Failed(failure) => {
                let code = match failure.kind {
                    FailureKind::Panic => codes::execution::COMPONENT_PANICKED,
                    FailureKind::Error => codes::execution::COMPONENT_FAILED,
                };
                log_warning!(
                    code = code,
                    "Component failed",
                    "pass_id" => self.pass_id,
                    "component" => id,
                    "error" => &failure.message
                );
            }
        }

        let Some(kind) = self.graph.node(id.as_str()).map(GraphNode::kind) else {
            return;
        };
        let event = OutcomeEvent {
            pass_id: self.pass_id,
            id,
            kind,
            outcome,
            elapsed,
        };

        for subscription in &self.executor.observers {
            if !subscription.accepts(kind) {
                continue;
            }
            let notified = panic::catch_unwind(AssertUnwindSafe(|| {
                subscription.observer.on_outcome(&event)
            }));
            if let Err(payload) = notified {
                log_warning!(
                    code = codes::execution::OBSERVER_PANICKED,
                    "Observer panicked",
                    "component" => id,
                    "error" => panic_message(payload.as_ref())
                );
            }
        }
    }
}

fn seeded_broker<I, T>(graph: &DependencyGraph, seeds: I) -> Result<Broker, BrokerError>
where
    I: IntoIterator<Item = (T, Fact)>,
    T: AsRef<str>,
{
    let mut broker = Broker::for_graph(graph);
    for (id, value) in seeds {
        broker.seed(id.as_ref(), value)?;
    }
    Ok(broker)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
