use std::path::PathBuf;

// Internal modules (private)
mod constants;
mod group;
mod init_system;
mod installer;
mod logger;
mod packages;
mod privilege;
mod verify;

pub mod detector;
pub mod error;
pub mod probe;
pub mod runner;

#[cfg(test)]
mod testing;

// Re-export public types
pub use detector::Distribution;
pub use error::InstallError;
pub use init_system::InitSystem;
pub use installer::{check_host, run_pipeline, CheckReport, InstallReport, ProgressCallback};
pub use logger::InstallLogger;
pub use packages::{plan_for, AptFlavor, AptSource};
pub use privilege::{resolve_elevation, ElevationMode};
pub use probe::{HostProbe, SystemProbe};
pub use runner::{CommandRunner, DryRunRunner, StepResult, StepStatus, SystemRunner};
pub use verify::{verify_installation, Component, InstallationOutcome};

/// What to do when a required step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and keep going
    #[default]
    Continue,
    /// Stop the run at the first failed required step
    Halt,
}

/// Configuration options for an installer run
#[derive(Debug, Clone)]
pub struct InstallConfig {
    /// Directory marker files are resolved under
    pub sysroot: PathBuf,
    /// Print the plan instead of executing it
    pub dry_run: bool,
    pub failure_policy: FailurePolicy,
    /// Add the invoking user to the docker group
    pub manage_group: bool,
    /// Keep a timestamped log of every command in the temp directory
    pub write_log_file: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            sysroot: PathBuf::from("/"),
            dry_run: false,
            failure_policy: FailurePolicy::Continue,
            manage_group: true,
            write_log_file: true,
        }
    }
}

/// Run the full installation against the real host
pub fn install(config: &InstallConfig, progress: Option<ProgressCallback>) -> error::Result<InstallReport> {
    let probe = SystemProbe::with_sysroot(&config.sysroot);

    if config.dry_run {
        log::info!("Running in DRY-RUN mode - no commands will be executed");
        return run_pipeline(config, &probe, &DryRunRunner, progress);
    }

    let logger = if config.write_log_file {
        match InstallLogger::new() {
            Ok(logger) => Some(logger),
            Err(e) => {
                log::warn!("Could not create install log: {}. Continuing without it", e);
                None
            }
        }
    } else {
        None
    };
    let runner = SystemRunner::new(logger);
    let result = run_pipeline(config, &probe, &runner, progress);
    let result = close_log(result, runner.logger());

    if runner.logger().is_some() {
        if let Err(e) = InstallLogger::cleanup_old_logs(&std::env::temp_dir(), crate::logger::KEEP_LOGS) {
            log::debug!("Failed to prune old install logs: {}", e);
        }
    }

    result
}

/// Finalizes the install log and records its path on the report or the error
fn close_log(result: error::Result<InstallReport>, logger: Option<&InstallLogger>) -> error::Result<InstallReport> {
    let Some(logger) = logger else {
        return result;
    };
    let log_file = logger.log_path().to_path_buf();

    if let Err(e) = &result {
        logger.warn(&format!("Aborted: {}", e));
    }
    logger.finalize();

    match result {
        Ok(mut report) => {
            report.log_file = Some(log_file);
            Ok(report)
        }
        Err(e) => Err(e.with_log_file(log_file)),
    }
}

/// Classify the real host and check what is installed, without changing anything
pub fn check(config: &InstallConfig) -> CheckReport {
    check_host(&SystemProbe::with_sysroot(&config.sysroot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = InstallConfig::default();
        assert_eq!(config.sysroot, PathBuf::from("/"));
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert!(config.manage_group);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_check_reads_markers_from_sysroot() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("etc")).unwrap();
        fs::write(temp.path().join("etc/fedora-release"), "Fedora release 40\n").unwrap();
        fs::create_dir_all(temp.path().join("run/systemd/system")).unwrap();

        let config = InstallConfig {
            sysroot: temp.path().to_path_buf(),
            ..InstallConfig::default()
        };
        let report = check(&config);
        assert_eq!(report.distribution, Distribution::Fedora);
        assert_eq!(report.init_system, InitSystem::Systemd);
    }

    #[test]
    fn test_halted_run_still_reports_the_log_file() {
        use crate::constants::markers;
        use crate::testing::{FakeProbe, RecordingRunner};

        let temp = TempDir::new().unwrap();
        let logger = InstallLogger::in_dir(temp.path()).unwrap();
        let probe = FakeProbe::new()
            .as_root()
            .with_path(markers::FEDORA)
            .with_path(markers::SYSTEMD);
        let runner = RecordingRunner::new().failing_on("dnf install -y docker-ce", 1);
        let config = InstallConfig {
            failure_policy: FailurePolicy::Halt,
            ..InstallConfig::default()
        };

        let result = run_pipeline(&config, &probe, &runner, Some(Box::new(|_: &str, _: u8| {})));
        let err = close_log(result, Some(&logger)).unwrap_err();

        assert_eq!(err.log_file(), Some(logger.log_path()));
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("Install Docker Engine and compose plugin"));

        let contents = fs::read_to_string(logger.log_path()).unwrap();
        assert!(contents.contains("Aborted: step 'Install Docker Engine and compose plugin' failed"));
        assert!(contents.contains("Finished:"));
    }

    #[test]
    fn test_completed_run_reports_the_log_file() {
        use crate::constants::markers;
        use crate::testing::{FakeProbe, RecordingRunner};

        let temp = TempDir::new().unwrap();
        let logger = InstallLogger::in_dir(temp.path()).unwrap();
        let probe = FakeProbe::new().as_root().with_path(markers::ALPINE);

        let result = run_pipeline(
            &InstallConfig::default(),
            &probe,
            &RecordingRunner::new(),
            Some(Box::new(|_: &str, _: u8| {})),
        );
        let report = close_log(result, Some(&logger)).unwrap();
        assert_eq!(report.log_file.as_deref(), Some(logger.log_path()));
    }

    #[test]
    fn test_dry_run_on_unsupported_sysroot_fails_cleanly() {
        let temp = TempDir::new().unwrap();
        let config = InstallConfig {
            sysroot: temp.path().to_path_buf(),
            dry_run: true,
            ..InstallConfig::default()
        };

        // Either elevation or distribution detection rejects an empty sysroot
        let err = install(&config, Some(Box::new(|_: &str, _: u8| {}))).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(matches!(
            err,
            InstallError::MissingElevationTool | InstallError::UnsupportedDistribution { .. }
        ));
    }
}
