//! Init-system detection and service enablement.

use crate::constants::{markers, SERVICE_NAME, SYSTEMD_UNIT};
use crate::probe::HostProbe;
use crate::runner::{PlannedCommand, Step};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InitSystem {
    Systemd,
    OpenRC,
    Unknown,
}

impl fmt::Display for InitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InitSystem::Systemd => "systemd",
            InitSystem::OpenRC => "OpenRC",
            InitSystem::Unknown => "unknown",
        })
    }
}

/// systemd is checked first; OpenRC is recognised by its runtime directory
/// or by `openrc-init` when OpenRC itself is PID 1.
pub fn detect_init_system(probe: &dyn HostProbe) -> InitSystem {
    if probe.path_exists(markers::SYSTEMD) {
        return InitSystem::Systemd;
    }

    if probe.path_exists(markers::OPENRC) || probe.path_exists(markers::OPENRC_INIT) {
        return InitSystem::OpenRC;
    }

    InitSystem::Unknown
}

/// Commands that enable the runtime at boot and start it now
pub fn enable_steps(init: InitSystem) -> Vec<Step> {
    match init {
        InitSystem::Systemd => vec![
            Step::run(
                "Enable docker service at boot",
                PlannedCommand::privileged("systemctl", &["enable", SYSTEMD_UNIT]),
            ),
            Step::run(
                "Start docker service",
                PlannedCommand::privileged("systemctl", &["start", SYSTEMD_UNIT]),
            ),
        ],
        InitSystem::OpenRC => vec![
            Step::run(
                "Add docker service to boot runlevel",
                PlannedCommand::privileged("rc-update", &["add", SERVICE_NAME, "boot"]),
            ),
            Step::run(
                "Start docker service",
                PlannedCommand::privileged("rc-service", &[SERVICE_NAME, "start"]),
            ),
        ],
        InitSystem::Unknown => Vec::new(),
    }
}

/// Shown when no init system was recognised; installation still continues
pub fn manual_enable_notice() -> String {
    format!(
        "Could not detect systemd or OpenRC. Enable and start the '{}' service manually.",
        SERVICE_NAME
    )
}
