//! Per-pass outcome broker
//!
//! The only channel through which components observe each other. One broker
//! per pass; never shared across passes.

pub mod error;
pub mod outcome;
pub mod store;

pub use error::BrokerError;
pub use outcome::{Absent, Failure, FailureKind, Outcome, SkipReason};
pub use store::Broker;
