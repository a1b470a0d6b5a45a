//! Elevation prefix resolution.

use crate::constants::ELEVATION_TOOLS;
use crate::error::{InstallError, Result};
use crate::probe::HostProbe;
use serde::Serialize;
use std::fmt;

/// How privileged commands get superuser rights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationMode {
    /// Already root, commands run as-is
    None,
    Sudo,
    Doas,
}

impl ElevationMode {
    /// Program prepended to privileged commands
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            ElevationMode::None => None,
            ElevationMode::Sudo => Some("sudo"),
            ElevationMode::Doas => Some("doas"),
        }
    }

    fn from_tool(tool: &str) -> Option<Self> {
        match tool {
            "sudo" => Some(ElevationMode::Sudo),
            "doas" => Some(ElevationMode::Doas),
            _ => None,
        }
    }
}

impl fmt::Display for ElevationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().unwrap_or("none (root)"))
    }
}

/// Picks the elevation prefix once for the whole run.
///
/// Root needs none and nothing is probed. Otherwise `sudo` wins over `doas`;
/// with neither available the run cannot continue.
pub fn resolve_elevation(probe: &dyn HostProbe) -> Result<ElevationMode> {
    if probe.is_root() {
        log::debug!("Running as root, no elevation prefix needed");
        return Ok(ElevationMode::None);
    }

    for tool in ELEVATION_TOOLS {
        if probe.command_exists(tool) {
            if let Some(mode) = ElevationMode::from_tool(tool) {
                log::info!("Using {} for privileged commands", tool);
                return Ok(mode);
            }
        }
    }

    Err(InstallError::MissingElevationTool)
}
