//! Executor configuration: environment defaults, TOML files, builder setters

pub mod constants;
pub mod error;
pub mod runtime;

pub use error::ConfigError;
pub use runtime::ExecutorConfig;
