// RUNTIME PREFERENCES (executor behavior)

use super::constants::{self, env as keys};
use super::error::ConfigError;
use crate::{log_error, log_warning};
use crate::logging::codes;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorConfig {
    /// Worker threads per tier; 1 runs every node on the calling thread
    pub max_threads: usize,

    /// Stop dispatching new nodes once a pass has run this long
    pub pass_timeout_ms: Option<u64>,

    /// Fail graph build on references to unregistered identities
    pub strict_references: bool,

    /// Identities skipped without invocation
    pub disabled: Vec<String>,

    /// Convert component panics into failures instead of unwinding the pass
    pub catch_panics: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }
}

impl ExecutorConfig {
    /// Build defaults from `lookup`, called with each `HOSTFACTS_*` key
    ///
    /// Values that do not parse or fall outside the bounds enforced by
    /// [`ExecutorConfig::validate`] are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_threads = read(&lookup, keys::MAX_THREADS, |threads: &usize| {
            (1..=constants::MAX_THREADS).contains(threads)
        })
        .unwrap_or_else(|| num_cpus::get().clamp(1, constants::DEFAULT_THREAD_CAP));

        Self {
            max_threads,
            pass_timeout_ms: read(&lookup, keys::PASS_TIMEOUT_MS, |ms: &u64| *ms > 0),
            strict_references: read(&lookup, keys::STRICT_REFERENCES, |_: &bool| true)
                .unwrap_or(false),
            disabled: lookup(keys::DISABLED)
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            catch_panics: read(&lookup, keys::CATCH_PANICS, |_: &bool| true).unwrap_or(true),
        }
    }

    /// Parse a TOML document; absent keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            log_error!(
                codes::config::UNREADABLE_FILE,
                "Cannot read configuration file",
                "path" => path.display(),
                "error" => &source
            );
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_threads == 0 || self.max_threads > constants::MAX_THREADS {
            return Err(invalid(
                "max_threads",
                format!("must be between 1 and {}", constants::MAX_THREADS),
            ));
        }
        if self.pass_timeout_ms == Some(0) {
            return Err(invalid("pass_timeout_ms", "must be greater than zero"));
        }
        if let Some(empty) = self.disabled.iter().position(|id| id.trim().is_empty()) {
            return Err(invalid("disabled", format!("entry {} is empty", empty)));
        }
        Ok(())
    }

    pub fn pass_timeout(&self) -> Option<Duration> {
        self.pass_timeout_ms.map(Duration::from_millis)
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        self.disabled.iter().any(|disabled| disabled == id)
    }

    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    pub fn with_pass_timeout(mut self, timeout: Duration) -> Self {
        self.pass_timeout_ms = Some(timeout.as_millis().min(u64::MAX as u128) as u64);
        self
    }

    pub fn without_pass_timeout(mut self) -> Self {
        self.pass_timeout_ms = None;
        self
    }

    pub fn with_strict_references(mut self, strict: bool) -> Self {
        self.strict_references = strict;
        self
    }

    pub fn with_disabled(mut self, id: impl Into<String>) -> Self {
        self.disabled.push(id.into());
        self
    }

    pub fn with_catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    let reason = reason.into();
    log_error!(
        codes::config::INVALID_VALUE,
        "Invalid configuration value",
        "field" => field,
        "reason" => &reason
    );
    ConfigError::InvalidValue { field, reason }
}

fn read<T, F, P>(lookup: &F, key: &str, accept: P) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
    P: Fn(&T) -> bool,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) if accept(&value) => Some(value),
        _ => {
            log_warning!(
                code = codes::config::INVALID_VALUE,
                "Ignoring environment value",
                "key" => key,
                "value" => &raw
            );
            None
        }
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_toml_overrides_and_defaults() {
        let config = ExecutorConfig::from_toml_str(
            r#"
            max_threads = 3
            pass_timeout_ms = 1500
            disabled = ["selinux_mode"]
            "#,
        )
        .unwrap();

        assert_eq!(config.max_threads, 3);
        assert_eq!(config.pass_timeout(), Some(Duration::from_millis(1500)));
        assert!(config.is_disabled("selinux_mode"));
        assert!(!config.is_disabled("os_release"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert_matches!(
            ExecutorConfig::from_toml_str("threads = 4"),
            Err(ConfigError::Parse(_))
        );
    }

    #[test]
    fn test_validation() {
        assert_matches!(
            ExecutorConfig::from_toml_str("max_threads = 0"),
            Err(ConfigError::InvalidValue { field: "max_threads", .. })
        );
        assert_matches!(
            ExecutorConfig::from_toml_str("pass_timeout_ms = 0"),
            Err(ConfigError::InvalidValue { field: "pass_timeout_ms", .. })
        );
        assert_matches!(
            ExecutorConfig::from_toml_str("max_threads = 2\ndisabled = [\" \"]"),
            Err(ConfigError::InvalidValue { field: "disabled", .. })
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_threads = 2\nstrict_references = true\ncatch_panics = false").unwrap();

        let config = ExecutorConfig::load(file.path()).unwrap();
        assert_eq!(config.max_threads, 2);
        assert!(config.strict_references);
        assert!(!config.catch_panics);

        assert_matches!(
            ExecutorConfig::load("/nonexistent/hostfacts.toml"),
            Err(ConfigError::Io { .. })
        );
    }

    #[test]
    fn test_builder() {
        let config = ExecutorConfig::from_lookup(|_| None)
            .with_max_threads(1)
            .with_pass_timeout(Duration::from_secs(2))
            .with_strict_references(true)
            .with_disabled("rule")
            .with_catch_panics(false);

        assert_eq!(config.max_threads, 1);
        assert_eq!(config.pass_timeout_ms, Some(2000));
        assert!(config.strict_references);
        assert!(config.is_disabled("rule"));
        assert!(!config.catch_panics);
        config.validate().unwrap();

        assert_eq!(config.without_pass_timeout().pass_timeout(), None);
    }

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_environment_values() {
        let config = ExecutorConfig::from_lookup(lookup(&[
            ("HOSTFACTS_MAX_THREADS", "3"),
            ("HOSTFACTS_PASS_TIMEOUT_MS", "250"),
            ("HOSTFACTS_STRICT_REFERENCES", "true"),
            ("HOSTFACTS_CATCH_PANICS", "false"),
            ("HOSTFACTS_DISABLED", "a, b"),
        ]));

        assert_eq!(config.max_threads, 3);
        assert_eq!(config.pass_timeout_ms, Some(250));
        assert!(config.strict_references);
        assert!(!config.catch_panics);
        assert_eq!(config.disabled, vec!["a", "b"]);
        config.validate().unwrap();
    }

    #[test]
    fn test_out_of_range_environment_values_ignored() {
        let config = ExecutorConfig::from_lookup(lookup(&[
            ("HOSTFACTS_MAX_THREADS", "0"),
            ("HOSTFACTS_PASS_TIMEOUT_MS", "0"),
            ("HOSTFACTS_CATCH_PANICS", "sometimes"),
        ]));

        assert!((1..=constants::DEFAULT_THREAD_CAP).contains(&config.max_threads));
        assert_eq!(config.pass_timeout_ms, None);
        assert!(config.catch_panics);
        config.validate().unwrap();

        let too_many = ExecutorConfig::from_lookup(lookup(&[("HOSTFACTS_MAX_THREADS", "100000")]));
        assert!(too_many.max_threads <= constants::DEFAULT_THREAD_CAP);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }
}
