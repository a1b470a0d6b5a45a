//! Pacman install branch (Arch Linux)

use crate::runner::{PlannedCommand, Step};

/// Arch ships Docker in its own repositories, no upstream repo needed
const PACKAGES: &[&str] = &["docker", "docker-compose", "docker-buildx"];

pub(super) fn plan() -> Vec<Step> {
    let mut install_args = vec!["-S", "--noconfirm", "--needed"];
    install_args.extend_from_slice(PACKAGES);

    vec![
        // Arch does not support partial upgrades, so sync and upgrade together
        Step::run(
            "Synchronize and upgrade system",
            PlannedCommand::privileged("pacman", &["-Syu", "--noconfirm"]),
        ),
        Step::run(
            "Install Docker and compose",
            PlannedCommand::privileged("pacman", &install_args),
        ),
    ]
}
