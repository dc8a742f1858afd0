//! Whitelisted command execution with timeout enforcement

use std::collections::BTreeSet;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Restricted PATH handed to every child process
const SAFE_PATH: &str = "/usr/bin:/bin:/usr/sbin:/sbin";

/// Executes whitelisted programs with a cleared environment and a deadline
#[derive(Debug, Clone)]
pub struct SystemCommandExecutor {
    default_timeout: Duration,
    allowed_commands: BTreeSet<String>,
}

impl SystemCommandExecutor {
    /// Create executor with empty whitelist - must be configured before use
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: timeout,
            allowed_commands: BTreeSet::new(),
        }
    }

    pub fn allow_command(&mut self, command: impl Into<String>) {
        self.allowed_commands.insert(command.into());
    }

    pub fn allow_commands(&mut self, commands: &[&str]) {
        self.allowed_commands
            .extend(commands.iter().map(|command| command.to_string()));
    }

    pub fn is_allowed(&self, command: &str) -> bool {
        self.allowed_commands.contains(command)
    }

    /// Whitelisted programs, sorted
    pub fn allowed_commands(&self) -> impl Iterator<Item = &str> {
        self.allowed_commands.iter().map(String::as_str)
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run `program` and capture its output
    ///
    /// Output pipes are drained on helper threads so a chatty child cannot
    /// block on a full pipe while the deadline runs.
    pub fn execute(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        if !self.is_allowed(program) {
            return Err(CommandError::SecurityViolation {
                reason: format!("Command '{}' not in whitelist", program),
            });
        }

        let timeout = timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();

        let mut child = Command::new(program)
            .args(args)
            .env_clear()
            .env("PATH", SAFE_PATH)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => CommandError::ProgramNotFound {
                    program: program.to_string(),
                },
                std::io::ErrorKind::PermissionDenied => CommandError::PermissionDenied {
                    program: program.to_string(),
                },
                _ => CommandError::ExecutionFailed {
                    program: program.to_string(),
                    reason: e.to_string(),
                },
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match child.wait_timeout(timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                terminate(&mut child);
                return Err(CommandError::Timeout {
                    program: program.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            Err(e) => {
                terminate(&mut child);
                return Err(CommandError::ExecutionFailed {
                    program: program.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        Ok(CommandOutput {
            stdout: collect(stdout),
            stderr: collect(stderr),
            exit_code: status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }
}

impl Default for SystemCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn collect(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Command execution output
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Command execution errors
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Program not found: {program}")]
    ProgramNotFound { program: String },

    #[error("Execution failed for '{program}': {reason}")]
    ExecutionFailed { program: String, reason: String },

    #[error("'{program}' timed out after {timeout_ms}ms")]
    Timeout { program: String, timeout_ms: u64 },

    #[error("Permission denied: {program}")]
    PermissionDenied { program: String },

    #[error("Security violation: {reason}")]
    SecurityViolation { reason: String },
}

impl CommandError {
    /// The program cannot run on this host at all
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ProgramNotFound { .. } | Self::PermissionDenied { .. } | Self::SecurityViolation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_empty_whitelist() {
        let executor = SystemCommandExecutor::new();
        assert!(!executor.is_allowed("uname"));
        assert_eq!(executor.allowed_commands().count(), 0);
    }

    #[test]
    fn test_whitelist_management() {
        let mut executor = SystemCommandExecutor::new();
        executor.allow_command("uname");
        executor.allow_commands(&["getenforce", "echo"]);

        let allowed: Vec<&str> = executor.allowed_commands().collect();
        assert_eq!(allowed, vec!["echo", "getenforce", "uname"]);
        assert!(!executor.is_allowed("rm"));
    }

    #[test]
    fn test_security_violation() {
        let executor = SystemCommandExecutor::new();
        let err = executor.execute("rm", &["-rf", "/tmp/x"], None).unwrap_err();
        assert_matches!(err, CommandError::SecurityViolation { .. });
        assert!(err.is_unavailable());
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_output() {
        let mut executor = SystemCommandExecutor::new();
        executor.allow_command("echo");

        let output = executor.execute("echo", &["hello"], None).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let mut executor = SystemCommandExecutor::new();
        executor.allow_command("sleep");

        let err = executor
            .execute("sleep", &["5"], Some(Duration::from_millis(50)))
            .unwrap_err();
        assert_matches!(err, CommandError::Timeout { timeout_ms: 50, .. });
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_missing_program() {
        let mut executor = SystemCommandExecutor::new();
        executor.allow_command("hostfacts-no-such-program");

        assert_matches!(
            executor.execute("hostfacts-no-such-program", &[], None),
            Err(CommandError::ProgramNotFound { .. })
        );
    }
}
