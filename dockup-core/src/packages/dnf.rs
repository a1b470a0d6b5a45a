//! DNF install branch (Fedora)

use crate::constants::{repo, DOCKER_CE_PACKAGES};
use crate::runner::{PlannedCommand, Step};

const CONFLICTING_PACKAGES: &[&str] = &[
    "docker",
    "docker-client",
    "docker-client-latest",
    "docker-common",
    "docker-latest",
    "docker-latest-logrotate",
    "docker-logrotate",
    "docker-selinux",
    "docker-engine-selinux",
    "docker-engine",
];

pub(super) fn plan() -> Vec<Step> {
    let mut remove_args = vec!["remove", "-y"];
    remove_args.extend_from_slice(CONFLICTING_PACKAGES);

    let mut install_args = vec!["install", "-y"];
    install_args.extend_from_slice(DOCKER_CE_PACKAGES);

    vec![
        Step::run(
            "Remove conflicting packages",
            PlannedCommand::privileged("dnf", &remove_args).tolerate_failure(),
        ),
        Step::run(
            "Install repository prerequisites",
            PlannedCommand::privileged("dnf", &["install", "-y", "curl"]),
        ),
        // dnf4 and dnf5 disagree on config-manager syntax; both read yum.repos.d
        Step::run(
            "Add Docker repository",
            PlannedCommand::privileged(
                "curl",
                &["-fsSL", repo::FEDORA_REPO_FILE, "-o", repo::FEDORA_REPO_PATH],
            ),
        ),
        Step::run(
            "Install Docker Engine and compose plugin",
            PlannedCommand::privileged("dnf", &install_args),
        ),
    ]
}
