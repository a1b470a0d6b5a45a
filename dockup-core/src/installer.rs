//! The installation pipeline.
//!
//! Stages run strictly in order: elevation, distribution, packages, service,
//! group membership, verification. Each stage's output is passed explicitly
//! to the next; nothing is shared through globals.

use crate::detector::{classify_distribution, detect_distribution, Distribution};
use crate::error::{InstallError, Result};
use crate::group;
use crate::init_system::{self, detect_init_system, InitSystem};
use crate::packages;
use crate::privilege::{resolve_elevation, ElevationMode};
use crate::probe::HostProbe;
use crate::runner::{execute, CommandRunner, Step, StepResult};
use crate::verify::{verify_installation, InstallationOutcome};
use crate::{FailurePolicy, InstallConfig};
use serde::Serialize;
use std::path::PathBuf;

/// Progress callback: (status_message, percentage)
pub type ProgressCallback = Box<dyn Fn(&str, u8) + Send>;

/// Routes progress to the callback, or stdout when there is none
struct ProgressReporter<'a> {
    callback: &'a Option<ProgressCallback>,
}

impl<'a> ProgressReporter<'a> {
    fn new(callback: &'a Option<ProgressCallback>) -> Self {
        Self { callback }
    }

    fn report(&self, message: &str, percentage: u8) {
        if let Some(ref cb) = self.callback {
            cb(message, percentage);
        } else {
            println!("[{}%] {}", percentage, message);
        }
    }
}

/// Everything a completed run did and found
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub elevation: ElevationMode,
    pub distribution: Distribution,
    pub init_system: InitSystem,
    pub steps: Vec<StepResult>,
    /// Informational messages the user should see
    pub notes: Vec<String>,
    pub outcome: InstallationOutcome,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl InstallReport {
    /// Steps that did not succeed, tolerated ones excluded
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter().filter(|s| s.is_blocking_failure())
    }
}

/// Classification of the host without installing anything
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// None when no elevation tool is available
    pub elevation: Option<ElevationMode>,
    pub distribution: Distribution,
    pub init_system: InitSystem,
    pub outcome: InstallationOutcome,
}

pub fn run_pipeline(
    config: &InstallConfig,
    probe: &dyn HostProbe,
    runner: &dyn CommandRunner,
    progress: Option<ProgressCallback>,
) -> Result<InstallReport> {
    let reporter = ProgressReporter::new(&progress);
    let policy = config.failure_policy;

    reporter.report("Resolving privileges...", 0);
    let elevation = resolve_elevation(probe)?;

    reporter.report("Detecting distribution...", 5);
    let distribution = detect_distribution(probe)?;

    let mut results = Vec::new();
    let mut notes = Vec::new();

    let plan = packages::plan_for(&distribution, probe);
    let total = plan.len().max(1);
    for (i, step) in plan.iter().enumerate() {
        let percentage = 10 + (i * 70 / total) as u8;
        reporter.report(&step.description, percentage);
        run_step(step, elevation, runner, policy, &mut results)?;
    }

    reporter.report("Detecting init system...", 80);
    let init_system = detect_init_system(probe);
    log::info!("Detected init system: {}", init_system);

    let enable = init_system::enable_steps(init_system);
    if enable.is_empty() {
        let notice = init_system::manual_enable_notice();
        log::warn!("{}", notice);
        notes.push(notice);
    }
    for step in &enable {
        reporter.report(&step.description, 85);
        run_step(step, elevation, runner, policy, &mut results)?;
    }

    if config.manage_group {
        if let Some(step) = group::plan_group_membership(&distribution, probe) {
            reporter.report(&step.description, 90);
            let added = run_step(&step, elevation, runner, policy, &mut results)?;
            if added && !config.dry_run {
                notes.push(group::relogin_notice(&step));
            }
        }
    }

    reporter.report("Verifying installation...", 95);
    let outcome = verify_installation(probe);
    reporter.report("Finished", 100);

    Ok(InstallReport {
        elevation,
        distribution,
        init_system,
        steps: results,
        notes,
        outcome,
        dry_run: config.dry_run,
        log_file: None,
    })
}

/// Runs a step, records it, and applies the failure policy.
/// Returns whether the step succeeded.
fn run_step(
    step: &Step,
    elevation: ElevationMode,
    runner: &dyn CommandRunner,
    policy: FailurePolicy,
    results: &mut Vec<StepResult>,
) -> Result<bool> {
    let result = execute(step, elevation, runner);
    let succeeded = result.is_success();

    if policy == FailurePolicy::Halt && result.is_blocking_failure() {
        return Err(InstallError::StepFailed {
            step: result.description.clone(),
            detail: result.failure_detail().unwrap_or_default(),
        });
    }

    results.push(result);
    Ok(succeeded)
}

/// Detection and verification only; never fails and never elevates
pub fn check_host(probe: &dyn HostProbe) -> CheckReport {
    CheckReport {
        elevation: resolve_elevation(probe).ok(),
        distribution: classify_distribution(probe),
        init_system: detect_init_system(probe),
        outcome: verify_installation(probe),
    }
}
