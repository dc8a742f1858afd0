//! Command-backed source

use crate::commands::SystemCommandExecutor;
use hostfacts_core::component::{Component, ComponentError, Fact, Inputs};
use hostfacts_core::log_debug;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Runs one whitelisted command and produces `{ "command", "stdout", "exit_code" }`
///
/// A program that is missing or not whitelisted is a benign absence; a
/// timeout or non-zero exit status is a failure.
#[derive(Debug, Clone)]
pub struct CommandOutputSource {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
    executor: Arc<SystemCommandExecutor>,
}

impl CommandOutputSource {
    pub fn new(executor: Arc<SystemCommandExecutor>, program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
            executor,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Command line as it would be typed
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Component for CommandOutputSource {
    fn invoke(&self, _inputs: &Inputs) -> Result<Fact, ComponentError> {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        log_debug!("Running command source", "command" => self.command_line());

        let output = self
            .executor
            .execute(&self.program, &args, self.timeout)
            .map_err(|e| {
                if e.is_unavailable() {
                    ComponentError::skip(e.to_string())
                } else {
                    ComponentError::failed(e.to_string())
                }
            })?;
        log_debug!(
            "Command finished",
            "command" => self.command_line(),
            "exit_code" => output.exit_code,
            "elapsed_ms" => output.duration.as_millis()
        );

        if !output.success() {
            return Err(ComponentError::failed(format!(
                "'{}' exited with status {}: {}",
                self.command_line(),
                output.exit_code,
                output.stderr.trim()
            )));
        }

        Ok(json!({
            "command": self.command_line(),
            "stdout": output.stdout,
            "exit_code": output.exit_code,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn executor(allowed: &[&str]) -> Arc<SystemCommandExecutor> {
        let mut executor = SystemCommandExecutor::new();
        executor.allow_commands(allowed);
        Arc::new(executor)
    }

    #[test]
    fn test_not_whitelisted_skips() {
        let source = CommandOutputSource::new(executor(&[]), "uname").arg("-r");
        let err = source.invoke(&Inputs::new()).unwrap_err();
        assert!(err.is_skip());
    }

    #[test]
    fn test_missing_program_skips() {
        let source = CommandOutputSource::new(
            executor(&["hostfacts-no-such-program"]),
            "hostfacts-no-such-program",
        );
        assert!(source.invoke(&Inputs::new()).unwrap_err().is_skip());
    }

    #[cfg(unix)]
    #[test]
    fn test_output_shape() {
        let source = CommandOutputSource::new(executor(&["echo"]), "echo").arg("5.14.0");
        let fact = source.invoke(&Inputs::new()).unwrap();

        assert_eq!(fact["command"], "echo 5.14.0");
        assert_eq!(fact["stdout"].as_str().map(str::trim), Some("5.14.0"));
        assert_eq!(fact["exit_code"], 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_fails() {
        let source = CommandOutputSource::new(executor(&["false"]), "false");
        let err = source.invoke(&Inputs::new()).unwrap_err();
        assert_matches!(err, ComponentError::Failed { ref message } if message.contains("exited with status 1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_fails() {
        let source = CommandOutputSource::new(executor(&["sleep"]), "sleep")
            .arg("5")
            .with_timeout(Duration::from_millis(50));
        let err = source.invoke(&Inputs::new()).unwrap_err();
        assert!(!err.is_skip());
    }
}
