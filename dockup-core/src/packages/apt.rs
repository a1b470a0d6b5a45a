//! APT install branch (Debian, Ubuntu)

use crate::constants::{markers, repo, DOCKER_CE_PACKAGES};
use crate::probe::HostProbe;
use crate::runner::{PlannedCommand, Step};

/// Distribution-provided packages that clash with Docker CE
const CONFLICTING_PACKAGES: &[&str] = &[
    "docker.io",
    "docker-doc",
    "docker-compose",
    "docker-compose-v2",
    "podman-docker",
    "containerd",
    "runc",
];

/// Which upstream apt repository to point at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AptFlavor {
    Debian,
    Ubuntu,
}

impl AptFlavor {
    fn slug(&self) -> &'static str {
        match self {
            AptFlavor::Debian => "debian",
            AptFlavor::Ubuntu => "ubuntu",
        }
    }

    /// Upstream repository family of the host, from os-release.
    ///
    /// Ubuntu carries `/etc/debian_version` and classifies as Debian, so the
    /// `ID` (then `ID_LIKE`, then `UBUNTU_CODENAME`) decides which repository
    /// the release codename belongs to. Falls back to `default`.
    pub fn detect(probe: &dyn HostProbe, default: AptFlavor) -> Self {
        let os_release = probe.read_file(markers::OS_RELEASE).unwrap_or_default();
        let from_id = |key: &str| {
            os_release_value(&os_release, key).and_then(|ids| {
                ids.split_whitespace().find_map(|id| match id {
                    "ubuntu" => Some(AptFlavor::Ubuntu),
                    "debian" => Some(AptFlavor::Debian),
                    _ => None,
                })
            })
        };

        from_id("ID")
            .or_else(|| from_id("ID_LIKE"))
            .or_else(|| {
                os_release_value(&os_release, "UBUNTU_CODENAME").map(|_| AptFlavor::Ubuntu)
            })
            .unwrap_or(default)
    }

    fn gpg_url(&self) -> String {
        format!("{}/{}/gpg", repo::DOWNLOAD_BASE, self.slug())
    }

    fn repo_url(&self) -> String {
        format!("{}/{}", repo::DOWNLOAD_BASE, self.slug())
    }
}

/// Host facts the repository definition line depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AptSource {
    pub arch: String,
    pub codename: Option<String>,
}

impl AptSource {
    /// Architecture from dpkg, codename from os-release then lsb_release.
    ///
    /// Ubuntu derivatives carry their own `VERSION_CODENAME`, so the Ubuntu
    /// repository prefers `UBUNTU_CODENAME`.
    pub fn resolve(flavor: AptFlavor, probe: &dyn HostProbe) -> Self {
        let arch = probe
            .command_output("dpkg", &["--print-architecture"])
            .unwrap_or_else(|| {
                let fallback = dpkg_arch_for(std::env::consts::ARCH);
                log::warn!("dpkg did not report an architecture, assuming {}", fallback);
                fallback.to_string()
            });

        let os_release = probe.read_file(markers::OS_RELEASE).unwrap_or_default();
        let keys = match flavor {
            AptFlavor::Debian => ["VERSION_CODENAME", "UBUNTU_CODENAME"],
            AptFlavor::Ubuntu => ["UBUNTU_CODENAME", "VERSION_CODENAME"],
        };
        let codename = keys
            .iter()
            .find_map(|key| os_release_value(&os_release, key))
            .or_else(|| probe.command_output("lsb_release", &["-cs"]));

        Self { arch, codename }
    }

    pub fn repository_line(&self, flavor: AptFlavor) -> Option<String> {
        self.codename.as_ref().map(|codename| {
            format!(
                "deb [arch={} signed-by={}] {} {} stable\n",
                self.arch,
                repo::APT_KEYRING,
                flavor.repo_url(),
                codename
            )
        })
    }
}

/// Debian architecture name for a Rust target architecture
fn dpkg_arch_for(target_arch: &str) -> &str {
    match target_arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "arm" => "armhf",
        "powerpc64" => "ppc64el",
        "x86" => "i386",
        other => other,
    }
}

/// Value of `key` in an os-release style file, quotes stripped
fn os_release_value(contents: &str, key: &str) -> Option<String> {
    contents
        .lines()
        .filter_map(|line| line.trim().split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|v| !v.is_empty())
}

pub(super) fn plan(flavor: AptFlavor, source: &AptSource) -> Vec<Step> {
    let mut remove_args = vec!["remove", "-y"];
    remove_args.extend_from_slice(CONFLICTING_PACKAGES);

    let mut install_args = vec!["install", "-y"];
    install_args.extend_from_slice(DOCKER_CE_PACKAGES);

    let repository = match source.repository_line(flavor) {
        Some(line) => Step::run(
            "Write Docker apt repository definition",
            PlannedCommand::privileged("tee", &[repo::APT_SOURCE_LIST]).with_stdin(line),
        ),
        None => Step::skip(
            "Write Docker apt repository definition",
            "could not determine the release codename",
        ),
    };

    vec![
        Step::run(
            "Remove conflicting packages",
            PlannedCommand::privileged("apt-get", &remove_args).tolerate_failure(),
        ),
        Step::run(
            "Refresh package index",
            PlannedCommand::privileged("apt-get", &["update"]),
        ),
        Step::run(
            "Install repository prerequisites",
            PlannedCommand::privileged("apt-get", &["install", "-y", "ca-certificates", "curl"]),
        ),
        Step::run(
            "Create keyring directory",
            PlannedCommand::privileged("install", &["-m", "0755", "-d", repo::APT_KEYRING_DIR]),
        ),
        Step::run(
            "Download Docker signing key",
            PlannedCommand::privileged(
                "curl",
                &["-fsSL", &flavor.gpg_url(), "-o", repo::APT_KEYRING],
            ),
        ),
        Step::run(
            "Make signing key readable",
            PlannedCommand::privileged("chmod", &["a+r", repo::APT_KEYRING]),
        ),
        repository,
        Step::run(
            "Refresh package index",
            PlannedCommand::privileged("apt-get", &["update"]),
        ),
        Step::run(
            "Install Docker Engine and compose plugin",
            PlannedCommand::privileged("apt-get", &install_args),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privilege::ElevationMode;
    use crate::runner::StepAction;
    use crate::testing::FakeProbe;

    fn bookworm() -> AptSource {
        AptSource {
            arch: "amd64".to_string(),
            codename: Some("bookworm".to_string()),
        }
    }

    #[test]
    fn test_repository_line() {
        assert_eq!(
            bookworm().repository_line(AptFlavor::Debian).unwrap(),
            "deb [arch=amd64 signed-by=/etc/apt/keyrings/docker.asc] https://download.docker.com/linux/debian bookworm stable\n"
        );
    }

    #[test]
    fn test_plan_order() {
        let steps = plan(AptFlavor::Ubuntu, &bookworm());
        let lines: Vec<String> = steps
            .iter()
            .map(|s| s.command().unwrap().display(ElevationMode::None))
            .collect();

        assert!(lines[0].starts_with("apt-get remove -y docker.io"));
        assert_eq!(lines[1], "apt-get update");
        assert_eq!(lines[3], "install -m 0755 -d /etc/apt/keyrings");
        assert_eq!(
            lines[4],
            "curl -fsSL https://download.docker.com/linux/ubuntu/gpg -o /etc/apt/keyrings/docker.asc"
        );
        assert_eq!(lines[6], "tee /etc/apt/sources.list.d/docker.list");
        assert_eq!(lines[7], "apt-get update");
        assert!(lines[8].ends_with("docker-compose-plugin"));
    }

    #[test]
    fn test_only_removal_is_tolerated() {
        let steps = plan(AptFlavor::Debian, &bookworm());
        let tolerated: Vec<&str> = steps
            .iter()
            .filter(|s| s.command().map(|c| c.tolerate_failure).unwrap_or(false))
            .map(|s| s.description.as_str())
            .collect();
        assert_eq!(tolerated, vec!["Remove conflicting packages"]);
    }

    #[test]
    fn test_missing_codename_skips_repository_definition() {
        let source = AptSource {
            arch: "amd64".to_string(),
            codename: None,
        };
        let steps = plan(AptFlavor::Debian, &source);
        assert!(matches!(steps[6].action, StepAction::Skip { .. }));
    }

    #[test]
    fn test_resolve_prefers_version_codename() {
        let probe = FakeProbe::new()
            .with_file(
                markers::OS_RELEASE,
                "ID=debian\nVERSION_CODENAME=bookworm\nUBUNTU_CODENAME=jammy\n",
            )
            .with_output("dpkg --print-architecture", "arm64");

        let source = AptSource::resolve(AptFlavor::Debian, &probe);
        assert_eq!(source.arch, "arm64");
        assert_eq!(source.codename.as_deref(), Some("bookworm"));
    }

    #[test]
    fn test_ubuntu_derivative_uses_ubuntu_codename() {
        let probe = FakeProbe::new().with_file(
            markers::OS_RELEASE,
            "ID=linuxmint\nID_LIKE=\"ubuntu debian\"\nVERSION_CODENAME=wilma\nUBUNTU_CODENAME=noble\n",
        );

        assert_eq!(AptFlavor::detect(&probe, AptFlavor::Debian), AptFlavor::Ubuntu);
        let source = AptSource::resolve(AptFlavor::Ubuntu, &probe);
        assert_eq!(source.codename.as_deref(), Some("noble"));
    }

    #[test]
    fn test_flavor_from_os_release_id() {
        let ubuntu = FakeProbe::new().with_file(markers::OS_RELEASE, "ID=ubuntu\n");
        assert_eq!(AptFlavor::detect(&ubuntu, AptFlavor::Debian), AptFlavor::Ubuntu);

        let debian = FakeProbe::new().with_file(markers::OS_RELEASE, "ID=debian\n");
        assert_eq!(AptFlavor::detect(&debian, AptFlavor::Ubuntu), AptFlavor::Debian);

        let unknown = FakeProbe::new();
        assert_eq!(AptFlavor::detect(&unknown, AptFlavor::Debian), AptFlavor::Debian);
    }

    #[test]
    fn test_resolve_falls_back_to_lsb_release() {
        let probe = FakeProbe::new().with_output("lsb_release -cs", "bullseye");
        let source = AptSource::resolve(AptFlavor::Debian, &probe);
        assert_eq!(source.codename.as_deref(), Some("bullseye"));
        assert_eq!(source.arch, dpkg_arch_for(std::env::consts::ARCH));
    }

    #[test]
    fn test_os_release_value_strips_quotes() {
        let contents = "ID=debian\nVERSION_CODENAME=\"trixie\"\nEMPTY=\n";
        assert_eq!(os_release_value(contents, "VERSION_CODENAME").as_deref(), Some("trixie"));
        assert_eq!(os_release_value(contents, "ID").as_deref(), Some("debian"));
        assert_eq!(os_release_value(contents, "EMPTY"), None);
        assert_eq!(os_release_value(contents, "MISSING"), None);
    }

    #[test]
    fn test_dpkg_arch_mapping() {
        assert_eq!(dpkg_arch_for("x86_64"), "amd64");
        assert_eq!(dpkg_arch_for("aarch64"), "arm64");
        assert_eq!(dpkg_arch_for("s390x"), "s390x");
    }
}
