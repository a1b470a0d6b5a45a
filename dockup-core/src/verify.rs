use crate::constants::{COMPOSE_EXECUTABLE, COMPOSE_PLUGIN_DIRS, RUNTIME_EXECUTABLE};
use crate::probe::HostProbe;
use serde::Serialize;

/// An installed piece the verifier looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Runtime,
    Compose,
}

impl Component {
    pub fn name(&self) -> &str {
        match self {
            Component::Runtime => "docker",
            Component::Compose => "docker compose",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Component::Runtime => "Container runtime CLI",
            Component::Compose => "Compose plugin for multi-container applications",
        }
    }

    /// Found on the search path; compose also counts as a docker CLI plugin
    pub fn is_available(&self, probe: &dyn HostProbe) -> bool {
        match self {
            Component::Runtime => probe.command_exists(RUNTIME_EXECUTABLE),
            Component::Compose => {
                probe.command_exists(COMPOSE_EXECUTABLE)
                    || COMPOSE_PLUGIN_DIRS
                        .iter()
                        .any(|dir| probe.path_exists(&format!("{}/{}", dir, COMPOSE_EXECUTABLE)))
            }
        }
    }
}

/// What is observably installed once every step has run.
///
/// Reflects presence only; a step that failed but left a working binary
/// behind still counts as present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstallationOutcome {
    pub runtime_present: bool,
    pub compose_present: bool,
}

impl InstallationOutcome {
    pub fn is_complete(&self) -> bool {
        self.runtime_present && self.compose_present
    }

    /// The single status line printed at the end of a run
    pub fn status_line(&self) -> String {
        if self.is_complete() {
            "🎉 Docker and Docker Compose are installed and ready to use!".to_string()
        } else {
            format!(
                "⚠️  Installation incomplete: docker installed: {}, docker compose installed: {}",
                self.runtime_present, self.compose_present
            )
        }
    }

    pub fn missing(&self) -> Vec<Component> {
        let mut missing = Vec::new();
        if !self.runtime_present {
            missing.push(Component::Runtime);
        }
        if !self.compose_present {
            missing.push(Component::Compose);
        }
        missing
    }
}

pub fn verify_installation(probe: &dyn HostProbe) -> InstallationOutcome {
    let outcome = InstallationOutcome {
        runtime_present: Component::Runtime.is_available(probe),
        compose_present: Component::Compose.is_available(probe),
    };

    for component in outcome.missing() {
        log::warn!("{} not found after installation", component.name());
    }

    outcome
}
