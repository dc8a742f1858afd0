//! # hostfacts CLI
//!
//! Runs one pass of the host registry and prints the pass report.

use clap::Parser;
use hostfacts_core::config::ExecutorConfig;
use hostfacts_core::execution::Executor;
use hostfacts_core::{log_info, HostfactsError};
use hostfacts_sdk::commands::create_host_command_executor;
use hostfacts_sdk::{create_host_registry_with, HostPaths};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "hostfacts", version, about = "Collect dependency-ordered host facts")]
struct Cli {
    /// Worker threads per tier
    #[arg(long)]
    threads: Option<usize>,

    /// Stop dispatching components after this many milliseconds
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,

    /// TOML executor configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run only these components and their dependencies (repeatable)
    #[arg(long = "target", value_name = "ID")]
    targets: Vec<String>,

    /// Read host files below this directory instead of /
    #[arg(long)]
    root: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            if err.is_configuration_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: &Cli) -> Result<(), HostfactsError> {
    let mut config = match &cli.config {
        Some(path) => ExecutorConfig::load(path)?,
        None => ExecutorConfig::default(),
    };
    if let Some(threads) = cli.threads {
        config = config.with_max_threads(threads);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_pass_timeout(Duration::from_millis(timeout_ms));
    }
    config.validate()?;

    let paths = cli
        .root
        .as_ref()
        .map(HostPaths::under)
        .unwrap_or_default();
    let registry = create_host_registry_with(&paths, create_host_command_executor())?;
    let executor = Executor::from_registry(&registry, config)?;

    let stats = executor.graph().get_stats();
    log_info!(
        "Dependency graph ready",
        "components" => stats.total_nodes,
        "tiers" => stats.tiers,
        "widest_tier" => stats.widest_tier
    );

    let result = if cli.targets.is_empty() {
        executor.run()
    } else {
        executor.run_targets(&cli.targets)?
    };

    let report = result.report();
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.summary());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from([
            "hostfacts",
            "--threads",
            "2",
            "--timeout-ms",
            "500",
            "--target",
            "kernel",
            "--target",
            "selinux_mode",
            "--json",
        ]);

        assert_eq!(cli.threads, Some(2));
        assert_eq!(cli.timeout_ms, Some(500));
        assert_eq!(cli.targets, vec!["kernel", "selinux_mode"]);
        assert!(cli.json);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_unknown_target_is_configuration_error() {
        let root = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "hostfacts",
            "--threads",
            "1",
            "--target",
            "nope",
            "--root",
            root.path().to_str().unwrap(),
        ]);

        let err = run(&cli).unwrap_err();
        assert!(err.is_configuration_error());
    }
}
