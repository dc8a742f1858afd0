//! Pass reporting

pub mod types;

pub use types::{ComponentReport, HostContext, PassReport, PassStatistics, TimestampInfo};
