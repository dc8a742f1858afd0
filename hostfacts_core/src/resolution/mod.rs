//! Dependency resolution
//!
//! Turns a registry snapshot into a tiered execution plan. Every
//! configuration error (cycles, unknown targets, strict unknown references)
//! surfaces here, before any component runs.

pub mod dag;
pub mod error;
pub mod providers;

pub use dag::{DependencyGraph, GraphBuilder, GraphNode, GraphStats};
pub use error::GraphError;
pub use providers::expand_groups;
