use crate::constants::markers;
use crate::error::{InstallError, Result};
use crate::probe::HostProbe;
use serde::Serialize;
use std::fmt;

/// Host distribution, as far as the installer cares
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    Debian,
    Ubuntu,
    Fedora,
    Arch,
    Alpine,
    /// Carries the reported name, or "unknown" when nothing matched
    Unsupported(String),
}

impl Distribution {
    pub fn name(&self) -> &str {
        match self {
            Distribution::Debian => "Debian",
            Distribution::Ubuntu => "Ubuntu",
            Distribution::Fedora => "Fedora",
            Distribution::Arch => "Arch Linux",
            Distribution::Alpine => "Alpine Linux",
            Distribution::Unsupported(name) => name,
        }
    }

    /// Package manager driving this distribution's install branch
    pub fn package_manager(&self) -> Option<&'static str> {
        match self {
            Distribution::Debian | Distribution::Ubuntu => Some("apt-get"),
            Distribution::Fedora => Some("dnf"),
            Distribution::Arch => Some("pacman"),
            Distribution::Alpine => Some("apk"),
            Distribution::Unsupported(_) => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Distribution::Unsupported(_))
    }

    /// Maps the distributor ID printed by `lsb_release -si`
    fn from_lsb_id(id: &str) -> Self {
        match id.trim().to_lowercase().as_str() {
            "ubuntu" => Distribution::Ubuntu,
            "debian" => Distribution::Debian,
            "fedora" => Distribution::Fedora,
            "arch" | "archlinux" => Distribution::Arch,
            "alpine" => Distribution::Alpine,
            _ => Distribution::Unsupported(id.trim().to_string()),
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies the host from marker files, first match wins.
///
/// The Debian marker is checked before the generic lsb-release marker, so a
/// Debian host carrying both stays Debian.
pub fn classify_distribution(probe: &dyn HostProbe) -> Distribution {
    if probe.path_exists(markers::DEBIAN) {
        return Distribution::Debian;
    }

    if probe.path_exists(markers::LSB_RELEASE) {
        return match probe.command_output("lsb_release", &["-si"]) {
            Some(id) => Distribution::from_lsb_id(&id),
            None => {
                log::warn!(
                    "{} exists but lsb_release reported nothing",
                    markers::LSB_RELEASE
                );
                Distribution::Unsupported("unknown".to_string())
            }
        };
    }

    if probe.path_exists(markers::FEDORA) {
        return Distribution::Fedora;
    }

    if probe.path_exists(markers::ARCH) {
        return Distribution::Arch;
    }

    if probe.path_exists(markers::ALPINE) {
        return Distribution::Alpine;
    }

    Distribution::Unsupported("unknown".to_string())
}

/// Classifies the host and rejects anything outside the five supported branches
pub fn detect_distribution(probe: &dyn HostProbe) -> Result<Distribution> {
    let distribution = classify_distribution(probe);
    match distribution {
        Distribution::Unsupported(name) => Err(InstallError::unsupported(name)),
        supported => {
            log::info!("Detected distribution: {}", supported);
            Ok(supported)
        }
    }
}
