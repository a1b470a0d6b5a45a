//! APK install branch (Alpine Linux)

use crate::runner::{PlannedCommand, Step};

const PACKAGES: &[&str] = &["docker", "docker-cli-compose"];

pub(super) fn plan() -> Vec<Step> {
    let mut add_args = vec!["add"];
    add_args.extend_from_slice(PACKAGES);

    vec![
        Step::run(
            "Refresh package index",
            PlannedCommand::privileged("apk", &["update"]),
        ),
        Step::run(
            "Install Docker and compose",
            PlannedCommand::privileged("apk", &add_args),
        ),
    ]
}
