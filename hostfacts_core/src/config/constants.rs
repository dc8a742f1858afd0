/// Upper bound on worker threads per pass
/// RESOURCE: Tiers wider than this are processed in chunks
pub const MAX_THREADS: usize = 256;

/// Cap applied to the CPU count when no thread count is configured
pub const DEFAULT_THREAD_CAP: usize = 8;

/// Environment variables read by `ExecutorConfig::default`
pub mod env {
    pub const MAX_THREADS: &str = "HOSTFACTS_MAX_THREADS";
    pub const PASS_TIMEOUT_MS: &str = "HOSTFACTS_PASS_TIMEOUT_MS";
    pub const STRICT_REFERENCES: &str = "HOSTFACTS_STRICT_REFERENCES";
    pub const CATCH_PANICS: &str = "HOSTFACTS_CATCH_PANICS";
    pub const DISABLED: &str = "HOSTFACTS_DISABLED";
}
