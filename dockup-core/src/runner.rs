//! Planned commands, their execution, and per-step results.
//!
//! Stages only describe what to run ([`Step`]); a [`CommandRunner`] runs it
//! and every step comes back as a [`StepResult`], so the caller decides
//! whether a failure stops the run.

use crate::logger::InstallLogger;
use crate::privilege::ElevationMode;
use serde::Serialize;
use std::io::Write;
use std::process::{Command, Stdio};

/// Lines of stderr kept in a failed step's result
const STDERR_TAIL_LINES: usize = 5;

/// One external command, before any elevation prefix is applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCommand {
    pub program: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
    pub privileged: bool,
    /// Failure is expected and never stops the run
    pub tolerate_failure: bool,
}

impl PlannedCommand {
    /// Command that runs through the elevation prefix
    pub fn privileged(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            stdin: None,
            privileged: true,
            tolerate_failure: false,
        }
    }

    pub fn unprivileged(program: &str, args: &[&str]) -> Self {
        Self {
            privileged: false,
            ..Self::privileged(program, args)
        }
    }

    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn tolerate_failure(mut self) -> Self {
        self.tolerate_failure = true;
        self
    }

    /// Full argv, elevation prefix included
    pub fn argv(&self, elevation: ElevationMode) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 2);
        if self.privileged {
            if let Some(prefix) = elevation.prefix() {
                argv.push(prefix.to_string());
            }
        }
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    pub fn display(&self, elevation: ElevationMode) -> String {
        self.argv(elevation).join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepAction {
    Run(PlannedCommand),
    /// Planning could not produce a command
    Skip { reason: String },
}

/// A described unit of work in a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub description: String,
    pub action: StepAction,
}

impl Step {
    pub fn run(description: impl Into<String>, command: PlannedCommand) -> Self {
        Self {
            description: description.into(),
            action: StepAction::Run(command),
        }
    }

    pub fn skip(description: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            action: StepAction::Skip {
                reason: reason.into(),
            },
        }
    }

    pub fn command(&self) -> Option<&PlannedCommand> {
        match &self.action {
            StepAction::Run(command) => Some(command),
            StepAction::Skip { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },
    SpawnFailed {
        message: String,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub tolerated: bool,
    #[serde(flatten)]
    pub status: StepStatus,
}

impl StepResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, StepStatus::Succeeded)
    }

    /// A failure that the halt policy stops on
    pub fn is_blocking_failure(&self) -> bool {
        !self.tolerated && !self.is_success()
    }

    /// Short human description of what went wrong
    pub fn failure_detail(&self) -> Option<String> {
        match &self.status {
            StepStatus::Succeeded => None,
            StepStatus::Failed { exit_code, stderr } => {
                let code = exit_code
                    .map(|c| format!("exit code {}", c))
                    .unwrap_or_else(|| "terminated by signal".to_string());
                if stderr.is_empty() {
                    Some(code)
                } else {
                    Some(format!("{}: {}", code, stderr))
                }
            }
            StepStatus::SpawnFailed { message } => Some(message.clone()),
            StepStatus::Skipped { reason } => Some(format!("skipped: {}", reason)),
        }
    }
}

/// Captured result of one process run
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes a fully-prefixed argv, blocking until it exits
pub trait CommandRunner {
    fn run(&self, argv: &[String], stdin: Option<&str>) -> std::io::Result<CommandOutput>;
}

/// Runs commands for real, mirroring their output into the install log
pub struct SystemRunner {
    logger: Option<InstallLogger>,
}

impl SystemRunner {
    pub fn new(logger: Option<InstallLogger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> Option<&InstallLogger> {
        self.logger.as_ref()
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String], stdin: Option<&str>) -> std::io::Result<CommandOutput> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line")
        })?;

        if let Some(logger) = &self.logger {
            logger.info(&format!("$ {}", argv.join(" ")));
        }

        let mut child = Command::new(program)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // The pipe is closed before waiting, even when the write fails
        let written = match (stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => pipe.write_all(input.as_bytes()),
            _ => Ok(()),
        };

        let output = child.wait_with_output()?;
        if let Err(e) = written {
            if let Some(logger) = &self.logger {
                logger.warn(&format!("could not write stdin: {} (exit status: {})", e, output.status));
            }
            return Err(e);
        }
        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if let Some(logger) = &self.logger {
            logger.log_stdout(&result.stdout);
            logger.log_stderr(&result.stderr);
            logger.debug(&format!("exit status: {}", output.status));
        }

        Ok(result)
    }
}

/// Reports success for everything without touching the host
#[derive(Debug, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, argv: &[String], _stdin: Option<&str>) -> std::io::Result<CommandOutput> {
        log::info!("[dry-run] {}", argv.join(" "));
        Ok(CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        })
    }
}

/// Runs one step and converts whatever happens into a result
pub fn execute(step: &Step, elevation: ElevationMode, runner: &dyn CommandRunner) -> StepResult {
    let command = match &step.action {
        StepAction::Run(command) => command,
        StepAction::Skip { reason } => {
            log::warn!("Skipping '{}': {}", step.description, reason);
            return StepResult {
                description: step.description.clone(),
                command: None,
                tolerated: false,
                status: StepStatus::Skipped {
                    reason: reason.clone(),
                },
            };
        }
    };

    let argv = command.argv(elevation);
    let display = argv.join(" ");
    log::debug!("Running: {}", display);

    let status = match runner.run(&argv, command.stdin.as_deref()) {
        Ok(output) if output.success() => StepStatus::Succeeded,
        Ok(output) => StepStatus::Failed {
            exit_code: output.exit_code,
            stderr: stderr_tail(&output.stderr),
        },
        Err(e) => StepStatus::SpawnFailed {
            message: format!("failed to execute {}: {}", argv[0], e),
        },
    };

    let result = StepResult {
        description: step.description.clone(),
        command: Some(display),
        tolerated: command.tolerate_failure,
        status,
    };

    if let Some(detail) = result.failure_detail() {
        if result.tolerated {
            log::debug!("'{}' failed (tolerated): {}", result.description, detail);
        } else {
            log::warn!("'{}' failed: {}", result.description, detail);
        }
    }

    result
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
