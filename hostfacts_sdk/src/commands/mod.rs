//! Command execution for command-backed sources

pub mod executor;

pub use executor::{CommandError, CommandOutput, SystemCommandExecutor};

use std::time::Duration;

/// Create the executor used by the host registry
///
/// Whitelist includes:
/// - uname: kernel release
/// - getenforce: SELinux enforcement mode
pub fn create_host_command_executor() -> SystemCommandExecutor {
    let mut executor = SystemCommandExecutor::with_timeout(Duration::from_secs(5));
    executor.allow_commands(&["uname", "getenforce"]);
    executor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_executor_whitelist() {
        let executor = create_host_command_executor();

        assert!(executor.is_allowed("uname"));
        assert!(executor.is_allowed("getenforce"));
        assert!(!executor.is_allowed("rm"));
        assert!(!executor.is_allowed("curl"));
        assert_eq!(executor.default_timeout(), Duration::from_secs(5));
    }
}
