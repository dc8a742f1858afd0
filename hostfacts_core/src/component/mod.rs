// src/component/mod.rs
//! Component model
//!
//! - [`Descriptor`] - identity, kind, dependency declarations and callable
//! - [`Component`] - the invocation contract (`Inputs` in, `Fact` out)
//! - [`ComponentError`] - benign skip or failure raised by a component

pub mod descriptor;
pub mod errors;
pub mod traits;

pub use descriptor::{ComponentId, ComponentKind, DependencyGroup, Descriptor, DescriptorBuilder};
pub use errors::ComponentError;
pub use traits::{Component, Fact, Inputs};
