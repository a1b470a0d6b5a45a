//! Runtime group membership for the invoking user.

use crate::constants::RUNTIME_GROUP;
use crate::detector::Distribution;
use crate::probe::HostProbe;
use crate::runner::{PlannedCommand, Step};

/// Step adding the invoking user to the runtime group, if one is needed.
///
/// Nothing is planned for root, for an unknown user, or when `id` already
/// lists the group.
pub fn plan_group_membership(distribution: &Distribution, probe: &dyn HostProbe) -> Option<Step> {
    let user = match probe.invoking_user() {
        Some(user) if user != "root" => user,
        Some(_) => {
            log::debug!("Invoked as root, skipping {} group membership", RUNTIME_GROUP);
            return None;
        }
        None => {
            log::debug!("Invoking user unknown, skipping {} group membership", RUNTIME_GROUP);
            return None;
        }
    };

    if is_member(probe, &user) {
        log::info!("{} is already in the {} group", user, RUNTIME_GROUP);
        return None;
    }

    // Alpine's busybox has no usermod
    let command = match distribution {
        Distribution::Alpine => PlannedCommand::privileged("addgroup", &[&user, RUNTIME_GROUP]),
        _ => PlannedCommand::privileged("usermod", &["-aG", RUNTIME_GROUP, &user]),
    };

    Some(Step::run(
        format!("Add {} to the {} group", user, RUNTIME_GROUP),
        command,
    ))
}

fn is_member(probe: &dyn HostProbe, user: &str) -> bool {
    probe
        .command_output("id", &["-nG", user])
        .map(|groups| groups.split_whitespace().any(|g| g == RUNTIME_GROUP))
        .unwrap_or(false)
}

/// Printed after a successful membership change
pub fn relogin_notice(user_step: &Step) -> String {
    format!(
        "{}: log out and back in (or run 'newgrp {}') for the change to take effect.",
        user_step.description, RUNTIME_GROUP
    )
}
