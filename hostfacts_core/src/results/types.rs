//! # Pass Report Types
//!
//! Serializable summary of one pass, suitable for JSON output and for
//! correlating runs across hosts.

use crate::broker::{FailureKind, Outcome, SkipReason};
use crate::component::{ComponentId, ComponentKind};
use crate::execution::PassResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Complete report for one pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassReport {
    /// Unique identifier for this pass
    pub pass_id: String,

    /// Host the pass ran on
    pub host: HostContext,

    pub timestamp: TimestampInfo,

    pub statistics: PassStatistics,

    /// Per-component outcomes in execution order
    pub components: Vec<ComponentReport>,
}

/// Host execution context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostContext {
    pub hostname: String,

    /// Operating system family and architecture of the collecting binary
    pub os_info: String,
}

/// Timestamp information for a pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampInfo {
    /// When the pass started (RFC3339 format)
    pub pass_start: DateTime<Utc>,

    /// When the pass completed (RFC3339 format)
    pub pass_end: DateTime<Utc>,

    /// Total execution duration in milliseconds
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentReport {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub outcome: Outcome,

    /// Time from dispatch to write; absent for seeded values
    pub elapsed_ms: Option<u64>,

    /// Value supplied by the caller instead of an invocation
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub seeded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStatistics {
    pub total: usize,
    pub values: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Failures caused by panics (included in `failed`)
    pub panicked: usize,
    /// Skips caused by cancellation or the pass deadline (included in `skipped`)
    pub cancelled: usize,
}

impl PassStatistics {
    fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Value(_) => self.values += 1,
            Outcome::Skipped(reason) => {
                self.skipped += 1;
                if *reason == SkipReason::Cancelled {
                    self.cancelled += 1;
                }
            }
            Outcome::Failed(failure) => {
                self.failed += 1;
                if failure.kind == FailureKind::Panic {
                    self.panicked += 1;
                }
            }
        }
    }

    /// Percentage of components that produced a value
    pub fn value_percentage(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.values as f32 / self.total as f32) * 100.0
        }
    }
}

impl PassReport {
    /// Build a report from a finished pass
    pub fn from_pass(result: &PassResult, host: HostContext) -> Self {
        let mut statistics = PassStatistics::default();
        let components = result
            .outcomes()
            .map(|(id, outcome)| {
                statistics.record(outcome);
                let seeded = result.is_seeded(id.as_str());
                ComponentReport {
                    id: id.clone(),
                    kind: result.kind(id.as_str()).unwrap_or(ComponentKind::Source),
                    outcome: outcome.clone(),
                    elapsed_ms: if seeded {
                        None
                    } else {
                        result
                            .elapsed(id.as_str())
                            .map(|elapsed| elapsed.as_millis() as u64)
                    },
                    seeded,
                }
            })
            .collect();

        Self {
            pass_id: result.pass_id().to_string(),
            host,
            timestamp: TimestampInfo {
                pass_start: result.started_at(),
                pass_end: result.finished_at(),
                duration_ms: result.duration().as_millis() as u64,
            },
            statistics,
            components,
        }
    }

    /// Check if every component produced a value
    pub fn is_complete(&self) -> bool {
        self.statistics.values == self.statistics.total
    }

    /// Check if the pass was cut short
    pub fn is_cancelled(&self) -> bool {
        self.statistics.cancelled > 0
    }

    pub fn component(&self, id: &str) -> Option<&ComponentReport> {
        self.components.iter().find(|c| c.id.as_str() == id)
    }

    /// Get components with a given status (`value`, `skipped`, `failed`)
    pub fn components_with_status(&self, status: &str) -> Vec<&ComponentReport> {
        self.components
            .iter()
            .filter(|c| c.outcome.status_str() == status)
            .collect()
    }

    /// Human-readable summary block
    pub fn summary(&self) -> String {
        let stats = &self.statistics;
        let mut out = String::new();

        let _ = writeln!(out, "Pass {} on {}", self.pass_id, self.host.hostname);
        let _ = writeln!(
            out,
            "  started {}  duration {} ms",
            self.timestamp.pass_start.to_rfc3339(),
            self.timestamp.duration_ms
        );
        let _ = writeln!(
            out,
            "  {} components: {} values, {} skipped, {} failed",
            stats.total, stats.values, stats.skipped, stats.failed
        );
        if stats.cancelled > 0 {
            let _ = writeln!(out, "  cancelled: {} components not dispatched", stats.cancelled);
        }

        for component in &self.components {
            let detail = match &component.outcome {
                Outcome::Value(value) => value.to_string(),
                Outcome::Skipped(reason) => reason.to_string(),
                Outcome::Failed(failure) => failure.message.clone(),
            };
            let _ = writeln!(
                out,
                "  [{:<7}] {} ({}): {}",
                component.outcome.status_str(),
                component.id,
                component.kind,
                truncate(&detail, 120)
            );
        }

        out
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize to compact JSON string
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl HostContext {
    /// Create host context from system information
    pub fn from_system() -> Self {
        Self {
            hostname: hostname::get()
                .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
                .to_string_lossy()
                .to_string(),
            os_info: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }

    pub fn new(hostname: impl Into<String>, os_info: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            os_info: os_info.into(),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentError, Descriptor, Inputs};
    use crate::config::ExecutorConfig;
    use crate::execution::Executor;
    use crate::registry::Registry;
    use serde_json::json;

    fn sample_result() -> PassResult {
        let registry = Registry::builder()
            .register(
                Descriptor::builder("src", ComponentKind::Source)
                    .invoke(|_: &Inputs| Ok(json!("enabled"))),
            )
            .unwrap()
            .register(
                Descriptor::builder("absent", ComponentKind::Source)
                    .invoke(|_: &Inputs| Err(ComponentError::skip("file not found"))),
            )
            .unwrap()
            .register(
                Descriptor::builder("rule", ComponentKind::Evaluator)
                    .requires("src")
                    .requires("host_context")
                    .invoke(|_: &Inputs| Ok(json!(true))),
            )
            .unwrap()
            .build();

        let config = ExecutorConfig::from_lookup(|_| None)
            .with_max_threads(1)
            .without_pass_timeout();
        Executor::from_registry(&registry, config)
            .unwrap()
            .run_seeded([("host_context", json!({"os": "linux"}))])
            .unwrap()
    }

    #[test]
    fn test_report_statistics() {
        let report = PassReport::from_pass(&sample_result(), HostContext::new("web01", "linux x86_64"));

        assert_eq!(report.statistics.total, 3);
        assert_eq!(report.statistics.values, 2);
        assert_eq!(report.statistics.skipped, 1);
        assert_eq!(report.statistics.failed, 0);
        assert!(!report.is_complete());
        assert!(!report.is_cancelled());
        assert_eq!(report.components_with_status("skipped").len(), 1);
        assert_eq!(report.component("rule").unwrap().kind, ComponentKind::Evaluator);
    }

    #[test]
    fn test_report_json_round_trip() {
        let report = PassReport::from_pass(&sample_result(), HostContext::new("web01", "linux"));
        let json = report.to_json().unwrap();
        assert!(json.contains("\"pass_id\""));
        assert!(json.contains("\"status\": \"skipped\""));

        let parsed = PassReport::from_json(&json).unwrap();
        assert_eq!(parsed.pass_id, report.pass_id);
        assert_eq!(parsed.components.len(), 3);
        assert_eq!(parsed.statistics, report.statistics);
    }

    #[test]
    fn test_summary_lists_components() {
        let report = PassReport::from_pass(&sample_result(), HostContext::new("web01", "linux"));
        let summary = report.summary();

        assert!(summary.contains("on web01"));
        assert!(summary.contains("3 components: 2 values, 1 skipped, 0 failed"));
        assert!(summary.contains("absent (source): file not found"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }

    #[test]
    fn test_host_context_from_system() {
        let host = HostContext::from_system();
        assert!(!host.hostname.is_empty());
        assert!(host.os_info.contains(std::env::consts::OS));
    }
}
