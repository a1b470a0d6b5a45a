//! Package-manager dispatch.
//!
//! Each supported distribution owns a fixed command sequence in its own
//! module. Nothing is shared between branches except the [`Step`] type.

use crate::detector::Distribution;
use crate::probe::HostProbe;
use crate::runner::Step;

mod apk;
mod apt;
mod dnf;
mod pacman;

pub use apt::{AptFlavor, AptSource};

/// Install sequence for `distribution`, in execution order.
///
/// Debian and Ubuntu read the host architecture and release codename through
/// `probe` to build their repository definition.
pub fn plan_for(distribution: &Distribution, probe: &dyn HostProbe) -> Vec<Step> {
    match distribution {
        Distribution::Debian => apt_plan(AptFlavor::Debian, probe),
        Distribution::Ubuntu => apt_plan(AptFlavor::Ubuntu, probe),
        Distribution::Fedora => dnf::plan(),
        Distribution::Arch => pacman::plan(),
        Distribution::Alpine => apk::plan(),
        Distribution::Unsupported(name) => {
            log::error!("No install branch for {}", name);
            Vec::new()
        }
    }
}

fn apt_plan(classified: AptFlavor, probe: &dyn HostProbe) -> Vec<Step> {
    let flavor = AptFlavor::detect(probe, classified);
    if flavor != classified {
        log::info!("Using the {:?} apt repository for this host", flavor);
    }
    apt::plan(flavor, &AptSource::resolve(flavor, probe))
}
