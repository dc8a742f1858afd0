//! # hostfacts SDK
//!
//! File and command sources plus a small set of demonstration components
//! wired into a ready-to-run registry.

pub mod commands;
pub mod extractors;
pub mod sources;

use commands::{create_host_command_executor, SystemCommandExecutor};
use extractors::{capabilities, ids, kernel, os_release, selinux};
use hostfacts_core::component::{ComponentKind, Descriptor};
use hostfacts_core::registry::{Registry, RegistryError};
use serde::{Deserialize, Serialize};
use sources::{CommandOutputSource, FileContentSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Host file locations read by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPaths {
    pub os_release: PathBuf,
    pub proc_osrelease: PathBuf,
    pub selinux_config: PathBuf,
}

impl Default for HostPaths {
    fn default() -> Self {
        Self::under("/")
    }
}

impl HostPaths {
    /// Same layout below an alternate root, e.g. a mounted image
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            os_release: root.join("etc/os-release"),
            proc_osrelease: root.join("proc/sys/kernel/osrelease"),
            selinux_config: root.join("etc/selinux/config"),
        }
    }
}

/// Create a registry with all demonstration components for this host
///
/// Includes:
/// - os-release file and parser
/// - kernel release from `uname -r` or `/proc/sys/kernel/osrelease`,
///   merged by the `kernel` aggregator
/// - SELinux mode from `getenforce` or `/etc/selinux/config`
pub fn create_host_registry() -> Result<Registry, RegistryError> {
    create_host_registry_with(&HostPaths::default(), create_host_command_executor())
}

pub fn create_host_registry_with(
    paths: &HostPaths,
    executor: SystemCommandExecutor,
) -> Result<Registry, RegistryError> {
    let executor = Arc::new(executor);

    let descriptors = vec![
        // os-release
        Descriptor::builder(ids::OS_RELEASE_FILE, ComponentKind::Source)
            .component(FileContentSource::new(&paths.os_release)),
        Descriptor::builder(ids::OS_RELEASE, ComponentKind::Extractor)
            .requires(ids::OS_RELEASE_FILE)
            .invoke(os_release::extract),
        // kernel release, two providers
        Descriptor::builder(ids::UNAME_R, ComponentKind::Source)
            .component(CommandOutputSource::new(Arc::clone(&executor), "uname").arg("-r")),
        Descriptor::builder(ids::PROC_OSRELEASE_FILE, ComponentKind::Source)
            .component(FileContentSource::new(&paths.proc_osrelease)),
        Descriptor::builder(ids::KERNEL_RELEASE_UNAME, ComponentKind::Extractor)
            .requires(ids::UNAME_R)
            .provides(capabilities::KERNEL_RELEASE)
            .invoke(kernel::from_source(ids::UNAME_R)),
        Descriptor::builder(ids::KERNEL_RELEASE_PROC, ComponentKind::Extractor)
            .requires(ids::PROC_OSRELEASE_FILE)
            .provides(capabilities::KERNEL_RELEASE)
            .invoke(kernel::from_source(ids::PROC_OSRELEASE_FILE)),
        Descriptor::builder(ids::KERNEL, ComponentKind::Aggregator)
            .at_least_one_of_capability(capabilities::KERNEL_RELEASE)
            .invoke(kernel::aggregate),
        // SELinux
        Descriptor::builder(ids::GETENFORCE, ComponentKind::Source)
            .component(CommandOutputSource::new(Arc::clone(&executor), "getenforce")),
        Descriptor::builder(ids::SELINUX_CONFIG_FILE, ComponentKind::Source)
            .component(FileContentSource::new(&paths.selinux_config)),
        Descriptor::builder(ids::SELINUX_CONFIG, ComponentKind::Extractor)
            .requires(ids::SELINUX_CONFIG_FILE)
            .invoke(selinux::extract_config),
        Descriptor::builder(ids::SELINUX_MODE, ComponentKind::Evaluator)
            .at_least_one([ids::GETENFORCE, ids::SELINUX_CONFIG])
            .optional(ids::OS_RELEASE)
            .invoke(selinux::evaluate),
    ];

    Ok(Registry::builder().register_all(descriptors)?.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostfacts_core::broker::{Outcome, SkipReason};
    use hostfacts_core::component::ComponentId;
    use hostfacts_core::config::ExecutorConfig;
    use hostfacts_core::execution::Executor;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn executor_for(root: &Path) -> Executor {
        // No whitelisted commands: every command source skips
        let registry =
            create_host_registry_with(&HostPaths::under(root), SystemCommandExecutor::new()).unwrap();
        let config = ExecutorConfig::from_lookup(|_| None)
            .with_max_threads(2)
            .without_pass_timeout()
            .with_strict_references(true);
        Executor::from_registry(&registry, config).unwrap()
    }

    #[test]
    fn test_host_paths_under_root() {
        let paths = HostPaths::under("/mnt/image");
        assert_eq!(paths.os_release, PathBuf::from("/mnt/image/etc/os-release"));
        assert_eq!(HostPaths::default().selinux_config, PathBuf::from("/etc/selinux/config"));

        let round: HostPaths = serde_json::from_str(&serde_json::to_string(&paths).unwrap()).unwrap();
        assert_eq!(round, paths);
    }

    #[test]
    fn test_registry_shape() {
        let registry = create_host_registry().unwrap();
        let stats = registry.get_statistics();

        assert_eq!(stats.total_components, 11);
        assert_eq!(stats.sources, 5);
        assert_eq!(stats.evaluators, 1);
        assert_eq!(
            registry.providers_of(capabilities::KERNEL_RELEASE),
            &[
                ComponentId::new(ids::KERNEL_RELEASE_UNAME),
                ComponentId::new(ids::KERNEL_RELEASE_PROC)
            ]
        );
    }

    #[test]
    fn test_pass_over_file_tree() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "etc/os-release", "ID=\"rhel\"\nVERSION_ID=\"9.3\"\n");
        write(root.path(), "proc/sys/kernel/osrelease", "5.14.0-362.el9.x86_64\n");
        write(root.path(), "etc/selinux/config", "SELINUX=enforcing\nSELINUXTYPE=targeted\n");

        let result = executor_for(root.path()).run();

        assert_eq!(result.value(ids::OS_RELEASE).unwrap()["VERSION_ID"], "9.3");
        assert!(result.outcome(ids::UNAME_R).unwrap().is_skipped());
        assert_matches::assert_matches!(
            result.outcome(ids::KERNEL_RELEASE_UNAME),
            Some(Outcome::Skipped(SkipReason::MissingRequired { .. }))
        );

        let kernel = result.value(ids::KERNEL).unwrap();
        assert_eq!(kernel["provider"], ids::KERNEL_RELEASE_PROC);
        assert_eq!(kernel["minor"], 14);

        let selinux = result.value(ids::SELINUX_MODE).unwrap();
        assert_eq!(selinux["mode"], "enforcing");
        assert_eq!(selinux["os"], "rhel");
    }

    #[test]
    fn test_empty_host_skips_everything_downstream() {
        let root = tempfile::tempdir().unwrap();
        let result = executor_for(root.path()).run();

        assert_eq!(result.outcomes().count(), 11);
        assert!(result.outcomes().all(|(_, outcome)| outcome.is_skipped()));
        assert_eq!(
            result.outcome(ids::SELINUX_MODE),
            Some(&Outcome::Skipped(SkipReason::UnsatisfiedGroup {
                index: 0,
                members: vec![ids::GETENFORCE.into(), ids::SELINUX_CONFIG.into()],
            }))
        );
        assert_eq!(result.report().statistics.skipped, 11);
        assert_eq!(result.report().statistics.failed, 0);
    }
}
