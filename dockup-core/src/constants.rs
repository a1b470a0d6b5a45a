//! Fixed paths, package names and URLs used across the installer.

/// Distribution marker files, in detection priority order
pub mod markers {
    pub const DEBIAN: &str = "/etc/debian_version";
    pub const LSB_RELEASE: &str = "/etc/lsb-release";
    pub const FEDORA: &str = "/etc/fedora-release";
    pub const ARCH: &str = "/etc/arch-release";
    pub const ALPINE: &str = "/etc/alpine-release";

    pub const OS_RELEASE: &str = "/etc/os-release";

    /// Present only when systemd is PID 1
    pub const SYSTEMD: &str = "/run/systemd/system";
    pub const OPENRC: &str = "/run/openrc";
    pub const OPENRC_INIT: &str = "/sbin/openrc-init";
}

/// Elevation tools, in priority order
pub const ELEVATION_TOOLS: &[&str] = &["sudo", "doas"];

/// Docker upstream repository locations
pub mod repo {
    pub const DOWNLOAD_BASE: &str = "https://download.docker.com/linux";
    pub const FEDORA_REPO_FILE: &str = "https://download.docker.com/linux/fedora/docker-ce.repo";
    pub const FEDORA_REPO_PATH: &str = "/etc/yum.repos.d/docker-ce.repo";

    pub const APT_KEYRING_DIR: &str = "/etc/apt/keyrings";
    pub const APT_KEYRING: &str = "/etc/apt/keyrings/docker.asc";
    pub const APT_SOURCE_LIST: &str = "/etc/apt/sources.list.d/docker.list";
}

/// Upstream Docker CE packages (apt and dnf share the names)
pub const DOCKER_CE_PACKAGES: &[&str] = &[
    "docker-ce",
    "docker-ce-cli",
    "containerd.io",
    "docker-buildx-plugin",
    "docker-compose-plugin",
];

pub const SERVICE_NAME: &str = "docker";
pub const SYSTEMD_UNIT: &str = "docker.service";
pub const RUNTIME_GROUP: &str = "docker";

/// Executables checked after installation
pub const RUNTIME_EXECUTABLE: &str = "docker";
pub const COMPOSE_EXECUTABLE: &str = "docker-compose";

/// Where the compose CLI plugin lands when installed as a docker plugin
pub const COMPOSE_PLUGIN_DIRS: &[&str] = &[
    "/usr/libexec/docker/cli-plugins",
    "/usr/lib/docker/cli-plugins",
    "/usr/local/lib/docker/cli-plugins",
];
