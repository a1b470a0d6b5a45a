//! Fatal installer conditions.
//!
//! Everything else (a failed package install, a missing init system) is
//! recorded as a step result and never surfaces here.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Conditions that abort the whole run
#[derive(Error, Debug)]
pub enum InstallError {
    /// Not root and neither `sudo` nor `doas` is available
    #[error("this installer needs root privileges, but neither sudo nor doas was found")]
    MissingElevationTool,

    /// No marker matched, or `lsb_release` named a distribution we do not handle
    #[error("unsupported distribution: {name}")]
    UnsupportedDistribution { name: String },

    /// A required step failed while running with the halt policy
    #[error("step '{step}' failed: {detail}")]
    StepFailed { step: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A run aborted after the install log was opened
    #[error("{source}")]
    Logged {
        source: Box<InstallError>,
        log_file: PathBuf,
    },
}

impl InstallError {
    pub fn unsupported(name: impl Into<String>) -> Self {
        Self::UnsupportedDistribution { name: name.into() }
    }

    /// Attach the install log so the caller can point at it
    pub fn with_log_file(self, log_file: PathBuf) -> Self {
        match self {
            Self::Logged { source, .. } => Self::Logged { source, log_file },
            other => Self::Logged {
                source: Box::new(other),
                log_file,
            },
        }
    }

    pub fn log_file(&self) -> Option<&Path> {
        match self {
            Self::Logged { log_file, .. } => Some(log_file),
            _ => None,
        }
    }

    /// Process exit code for this condition
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Result type alias for installer operations
pub type Result<T> = std::result::Result<T, InstallError>;
