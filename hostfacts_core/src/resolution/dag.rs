//! Dependency Graph (DAG) for component execution ordering
//! Handles tier partitioning and cycle detection over a registry snapshot

use crate::component::{ComponentId, ComponentKind, Descriptor};
use crate::log_debug;
use crate::log_error;
use crate::logging::codes;
use crate::registry::Registry;
use crate::resolution::error::GraphError;
use crate::resolution::providers::expand_groups;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// Node in the dependency graph representing one registered component
#[derive(Debug, Clone)]
pub struct GraphNode {
    descriptor: Arc<Descriptor>,
    groups: Vec<Vec<ComponentId>>,
    dependencies: Vec<ComponentId>,
    dependents: Vec<ComponentId>,
    tier: usize,
}

impl GraphNode {
    pub fn id(&self) -> &ComponentId {
        self.descriptor.id()
    }

    pub fn kind(&self) -> ComponentKind {
        self.descriptor.kind()
    }

    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.descriptor
    }

    pub fn requires(&self) -> &[ComponentId] {
        self.descriptor.requires()
    }

    /// Alternative groups with capability groups already expanded
    pub fn groups(&self) -> &[Vec<ComponentId>] {
        &self.groups
    }

    pub fn optional(&self) -> &[ComponentId] {
        self.descriptor.optional()
    }

    /// Registered components this node is ordered after (hard and soft edges)
    pub fn dependencies(&self) -> &[ComponentId] {
        &self.dependencies
    }

    /// Registered components ordered after this node
    pub fn dependents(&self) -> &[ComponentId] {
        &self.dependents
    }

    /// Index of the tier this node executes in
    pub fn tier(&self) -> usize {
        self.tier
    }

    /// Every identity this node reads, registered or external
    fn referenced(&self) -> impl Iterator<Item = &ComponentId> {
        self.requires()
            .iter()
            .chain(self.groups.iter().flatten())
            .chain(self.optional().iter())
    }

    /// Identities that must resolve before this node may run
    fn hard_references(&self) -> impl Iterator<Item = &ComponentId> {
        self.requires().iter().chain(self.groups.iter().flatten())
    }
}

/// Dependency graph for component execution ordering
///
/// Read-only once built; share it behind an `Arc` across passes.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<ComponentId, GraphNode>,
    tiers: Vec<Vec<ComponentId>>,
    externals: BTreeSet<ComponentId>,
}

impl DependencyGraph {
    /// Build with default options (unknown references become external inputs)
    pub fn build(registry: &Registry) -> Result<Self, GraphError> {
        GraphBuilder::new(registry).build()
    }

    pub fn builder(registry: &Registry) -> GraphBuilder<'_> {
        GraphBuilder::new(registry)
    }

    /// Tiers in execution order; identities within a tier are sorted
    pub fn tiers(&self) -> &[Vec<ComponentId>] {
        &self.tiers
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Registered identities in tier order
    pub fn execution_order(&self) -> impl Iterator<Item = &ComponentId> {
        self.tiers.iter().flatten()
    }

    /// Identities referenced by some node but not registered
    pub fn externals(&self) -> impl Iterator<Item = &ComponentId> {
        self.externals.iter()
    }

    pub fn is_external(&self, id: &str) -> bool {
        self.externals.contains(id)
    }

    /// Get dependencies for a component
    pub fn get_dependencies(&self, id: &str) -> &[ComponentId] {
        self.nodes.get(id).map(GraphNode::dependencies).unwrap_or(&[])
    }

    /// Get dependents for a component
    pub fn get_dependents(&self, id: &str) -> &[ComponentId] {
        self.nodes.get(id).map(GraphNode::dependents).unwrap_or(&[])
    }

    /// Restrict the graph to `targets` and everything they depend on
    pub fn subgraph<I, T>(&self, targets: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut retained: HashSet<ComponentId> = HashSet::new();
        let mut stack: Vec<&ComponentId> = Vec::new();

        for target in targets {
            let target = target.as_ref();
            let node = self.nodes.get(target).ok_or_else(|| GraphError::UnknownTarget {
                id: target.to_string(),
            })?;
            stack.push(node.id());
        }

        while let Some(id) = stack.pop() {
            if !retained.insert(id.clone()) {
                continue;
            }
            stack.extend(self.get_dependencies(id.as_str()));
        }

        let mut nodes = BTreeMap::new();
        let mut externals = BTreeSet::new();
        for (id, node) in &self.nodes {
            if !retained.contains(id) {
                continue;
            }
            let mut node = node.clone();
            node.dependents.retain(|dependent| retained.contains(dependent));
            externals.extend(
                node.referenced()
                    .filter(|referenced| self.externals.contains(*referenced))
                    .cloned(),
            );
            nodes.insert(id.clone(), node);
        }

        let tiers: Vec<Vec<ComponentId>> = self
            .tiers
            .iter()
            .map(|tier| {
                tier.iter()
                    .filter(|id| retained.contains(*id))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .filter(|tier| !tier.is_empty())
            .collect();

        let mut graph = Self {
            nodes,
            tiers,
            externals,
        };
        graph.assign_tier_indexes();

        log_debug!(
            "Built target subgraph",
            "nodes" => graph.len(),
            "of" => self.len(),
            "tiers" => graph.tiers.len()
        );

        Ok(graph)
    }

    /// Validate graph integrity: edges reference known nodes, reverse edges
    /// agree with forward edges, and every hard dependency sits in an earlier tier
    pub fn validate(&self) -> Result<(), GraphError> {
        let scheduled: usize = self.tiers.iter().map(Vec::len).sum();
        if scheduled != self.nodes.len() {
            return Err(GraphError::DependencyGraphCorrupted {
                details: format!(
                    "{} nodes but {} scheduled in tiers",
                    self.nodes.len(),
                    scheduled
                ),
            });
        }

        for (id, node) in &self.nodes {
            for dependency in node.dependencies() {
                let target = self.nodes.get(dependency).ok_or_else(|| {
                    GraphError::DependencyGraphCorrupted {
                        details: format!(
                            "Edge from '{}' references non-existent node: {}",
                            id, dependency
                        ),
                    }
                })?;

                if !target.dependents.contains(id) {
                    return Err(GraphError::DependencyGraphCorrupted {
                        details: format!("Missing reverse edge: {} -> {}", dependency, id),
                    });
                }
            }

            for dependency in node.hard_references() {
                if let Some(target) = self.nodes.get(dependency) {
                    if target.tier >= node.tier {
                        return Err(GraphError::DependencyGraphCorrupted {
                            details: format!(
                                "'{}' (tier {}) is not ordered after '{}' (tier {})",
                                id, node.tier, dependency, target.tier
                            ),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Get graph statistics for monitoring
    pub fn get_stats(&self) -> GraphStats {
        let total_edges = self.nodes.values().map(|n| n.dependencies.len()).sum();
        let max_dependencies = self
            .nodes
            .values()
            .map(|n| n.dependencies.len())
            .max()
            .unwrap_or(0);

        GraphStats {
            total_nodes: self.nodes.len(),
            total_edges,
            tiers: self.tiers.len(),
            widest_tier: self.tiers.iter().map(Vec::len).max().unwrap_or(0),
            external_inputs: self.externals.len(),
            max_dependencies,
            nodes_with_no_dependencies: self
                .nodes
                .values()
                .filter(|n| n.dependencies.is_empty())
                .count(),
        }
    }

    fn assign_tier_indexes(&mut self) {
        for (index, tier) in self.tiers.iter().enumerate() {
            for id in tier {
                if let Some(node) = self.nodes.get_mut(id) {
                    node.tier = index;
                }
            }
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builds a [`DependencyGraph`] from a registry snapshot
pub struct GraphBuilder<'a> {
    registry: &'a Registry,
    strict_references: bool,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            strict_references: false,
        }
    }

    /// Fail on references to unregistered identities instead of treating
    /// them as external inputs
    pub fn strict_references(mut self, strict: bool) -> Self {
        self.strict_references = strict;
        self
    }

    pub fn build(self) -> Result<DependencyGraph, GraphError> {
        let mut nodes: BTreeMap<ComponentId, GraphNode> = BTreeMap::new();
        let mut externals = BTreeSet::new();

        for descriptor in self.registry.all() {
            let groups = expand_groups(descriptor, self.registry, self.strict_references)?;
            let mut node = GraphNode {
                descriptor: Arc::clone(descriptor),
                groups,
                dependencies: Vec::new(),
                dependents: Vec::new(),
                tier: 0,
            };

            let mut dependencies = Vec::new();
            for referenced in node.referenced() {
                if self.registry.contains(referenced.as_str()) {
                    if !dependencies.contains(referenced) {
                        dependencies.push(referenced.clone());
                    }
                } else if self.strict_references {
                    log_error!(
                        codes::graph::UNKNOWN_REFERENCE,
                        "Dependency is not registered",
                        "id" => referenced,
                        "referenced_by" => descriptor.id()
                    );
                    return Err(GraphError::NotFound {
                        id: referenced.clone(),
                        referenced_by: descriptor.id().clone(),
                    });
                } else if externals.insert(referenced.clone()) {
                    log_debug!(
                        "Treating unregistered dependency as external input",
                        "id" => referenced,
                        "referenced_by" => descriptor.id()
                    );
                }
            }
            node.dependencies = dependencies;

            nodes.insert(descriptor.id().clone(), node);
        }

        // Reverse edges
        let edges: Vec<(ComponentId, ComponentId)> = nodes
            .values()
            .flat_map(|node| {
                node.dependencies
                    .iter()
                    .map(move |dependency| (dependency.clone(), node.id().clone()))
            })
            .collect();
        for (dependency, dependent) in edges {
            if let Some(node) = nodes.get_mut(&dependency) {
                node.dependents.push(dependent);
            }
        }

        let tiers = partition_tiers(&nodes)?;

        let mut graph = DependencyGraph {
            nodes,
            tiers,
            externals,
        };
        graph.assign_tier_indexes();

        log_debug!(
            "Dependency graph built",
            "nodes" => graph.len(),
            "tiers" => graph.tiers.len(),
            "externals" => graph.externals.len()
        );

        Ok(graph)
    }
}

/// Kahn-style tiering with lexical order inside each tier
fn partition_tiers(
    nodes: &BTreeMap<ComponentId, GraphNode>,
) -> Result<Vec<Vec<ComponentId>>, GraphError> {
    let mut in_degree: HashMap<&ComponentId, usize> = nodes
        .iter()
        .map(|(id, node)| (id, node.dependencies.len()))
        .collect();

    // BTreeMap iteration is already sorted
    let mut current: Vec<ComponentId> = nodes
        .iter()
        .filter(|(_, node)| node.dependencies.is_empty())
        .map(|(id, _)| id.clone())
        .collect();

    let mut tiers = Vec::new();
    let mut scheduled = 0;

    while !current.is_empty() {
        let mut next = Vec::new();

        for id in &current {
            for dependent in &nodes[id].dependents {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        next.push(dependent.clone());
                    }
                }
            }
        }

        scheduled += current.len();
        next.sort();
        tiers.push(current);
        current = next;
    }

    if scheduled != nodes.len() {
        let remaining: BTreeSet<&ComponentId> = in_degree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(id, _)| id)
            .collect();

        let cycle = find_cycle(nodes, &remaining).ok_or_else(|| {
            GraphError::DependencyGraphCorrupted {
                details: format!(
                    "Tiering incomplete: {} unscheduled nodes but no cycle found",
                    remaining.len()
                ),
            }
        })?;

        let rendered = cycle
            .iter()
            .map(ComponentId::as_str)
            .collect::<Vec<_>>()
            .join(" -> ");
        log_error!(
            codes::graph::DEPENDENCY_CYCLE,
            "Dependency cycle detected",
            "cycle" => rendered,
            "unscheduled" => remaining.len()
        );

        return Err(GraphError::DependencyCycle { cycle });
    }

    Ok(tiers)
}

/// Find one representative cycle among unscheduled nodes using DFS
fn find_cycle<'g>(
    nodes: &'g BTreeMap<ComponentId, GraphNode>,
    remaining: &BTreeSet<&'g ComponentId>,
) -> Option<Vec<ComponentId>> {
    let mut visited = HashSet::new();
    let mut on_stack = HashSet::new();
    let mut path = Vec::new();

    for &start in remaining {
        if !visited.contains(start) {
            if let Some(cycle) =
                dfs_cycle_detect(nodes, remaining, start, &mut visited, &mut on_stack, &mut path)
            {
                return Some(cycle);
            }
        }
    }

    None
}

fn dfs_cycle_detect<'g>(
    nodes: &'g BTreeMap<ComponentId, GraphNode>,
    remaining: &BTreeSet<&ComponentId>,
    node: &'g ComponentId,
    visited: &mut HashSet<&'g ComponentId>,
    on_stack: &mut HashSet<&'g ComponentId>,
    path: &mut Vec<&'g ComponentId>,
) -> Option<Vec<ComponentId>> {
    visited.insert(node);
    on_stack.insert(node);
    path.push(node);

    for dependency in nodes[node].dependencies() {
        if !remaining.contains(dependency) {
            continue;
        }
        if on_stack.contains(dependency) {
            // Back edge: the cycle is the path from `dependency` to here
            let start = path.iter().position(|id| *id == dependency).unwrap_or(0);
            let mut cycle: Vec<ComponentId> = path[start..].iter().map(|id| (*id).clone()).collect();
            cycle.push(dependency.clone());
            return Some(cycle);
        }
        if !visited.contains(dependency) {
            if let Some(cycle) =
                dfs_cycle_detect(nodes, remaining, dependency, visited, on_stack, path)
            {
                return Some(cycle);
            }
        }
    }

    on_stack.remove(node);
    path.pop();
    None
}

/// Graph statistics for monitoring and debugging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub tiers: usize,
    pub widest_tier: usize,
    pub external_inputs: usize,
    pub max_dependencies: usize,
    pub nodes_with_no_dependencies: usize,
}

impl GraphStats {
    /// Calculate average dependencies per node
    pub fn average_dependencies(&self) -> f64 {
        if self.total_nodes == 0 {
            0.0
        } else {
            self.total_edges as f64 / self.total_nodes as f64
        }
    }
}
