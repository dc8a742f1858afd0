// src/registry/mod.rs
//! Component registry
//!
//! Descriptors are registered explicitly through [`Registry::register`] or a
//! [`RegistryBuilder`] at startup. Identity collisions are rejected on
//! registration, before any dependency graph is built.

pub mod catalog;
pub mod error;

pub use catalog::{Registry, RegistryBuilder, RegistryStatistics};
pub use error::RegistryError;
