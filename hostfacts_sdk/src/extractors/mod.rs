//! Demonstration extractors, aggregators and evaluators

pub mod kernel;
pub mod os_release;
pub mod selinux;

/// Identities registered by [`crate::create_host_registry`]
pub mod ids {
    pub const OS_RELEASE_FILE: &str = "os_release_file";
    pub const OS_RELEASE: &str = "os_release";

    pub const UNAME_R: &str = "uname_r";
    pub const PROC_OSRELEASE_FILE: &str = "proc_osrelease_file";
    pub const KERNEL_RELEASE_UNAME: &str = "kernel_release_uname";
    pub const KERNEL_RELEASE_PROC: &str = "kernel_release_proc";
    pub const KERNEL: &str = "kernel";

    pub const GETENFORCE: &str = "getenforce";
    pub const SELINUX_CONFIG_FILE: &str = "selinux_config_file";
    pub const SELINUX_CONFIG: &str = "selinux_config";
    pub const SELINUX_MODE: &str = "selinux_mode";
}

/// Capabilities provided by the host registry
pub mod capabilities {
    pub const KERNEL_RELEASE: &str = "kernel_release";
}

use hostfacts_core::component::ComponentError;
use regex::Regex;
use std::sync::OnceLock;

/// Compiled `pattern`, built once per `cell`
fn compile(cell: &'static OnceLock<Regex>, pattern: &str) -> Result<&'static Regex, ComponentError> {
    if let Some(regex) = cell.get() {
        return Ok(regex);
    }
    let regex = Regex::new(pattern)
        .map_err(|e| ComponentError::failed(format!("invalid pattern: {}", e)))?;
    Ok(cell.get_or_init(|| regex))
}
