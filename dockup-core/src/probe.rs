//! Observations of the host system.
//!
//! Every stage of the installer looks at the machine only through
//! [`HostProbe`], so detection logic can be exercised against a fake host.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Read-only view of the host the installer runs on
pub trait HostProbe {
    /// Whether the effective user is root
    fn is_root(&self) -> bool;

    /// Whether an absolute marker path exists
    fn path_exists(&self, path: &str) -> bool;

    /// Contents of an absolute path, if readable
    fn read_file(&self, path: &str) -> Option<String>;

    /// Whether an executable is resolvable on the search path
    fn command_exists(&self, name: &str) -> bool;

    /// Trimmed stdout of a successful, non-empty command run
    fn command_output(&self, program: &str, args: &[&str]) -> Option<String>;

    /// Name of the user who invoked the installer (before elevation)
    fn invoking_user(&self) -> Option<String>;
}

/// Environment variables naming the invoking user, most specific first
const USER_VARS: &[&str] = &["SUDO_USER", "DOAS_USER", "USER"];

/// Executable directories searched when the probe is rooted elsewhere than `/`
const SYSROOT_SEARCH_DIRS: &[&str] = &[
    "/usr/local/sbin",
    "/usr/local/bin",
    "/usr/sbin",
    "/usr/bin",
    "/sbin",
    "/bin",
];

/// Probe backed by the real filesystem, PATH and process table
#[derive(Debug, Clone)]
pub struct SystemProbe {
    sysroot: PathBuf,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self::with_sysroot("/")
    }

    /// Resolve marker paths beneath `sysroot` instead of `/`
    pub fn with_sysroot(sysroot: impl Into<PathBuf>) -> Self {
        Self {
            sysroot: sysroot.into(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        let relative = path.strip_prefix("/").unwrap_or(path);
        self.sysroot.join(relative)
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HostProbe for SystemProbe {
    fn is_root(&self) -> bool {
        #[cfg(unix)]
        {
            unsafe { libc::geteuid() == 0 }
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    fn path_exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    fn read_file(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.resolve(path)).ok()
    }

    /// Looks on PATH, or in the standard bin directories under a non-root sysroot
    fn command_exists(&self, name: &str) -> bool {
        if self.sysroot == Path::new("/") {
            return which::which(name).is_ok();
        }

        let dirs: Vec<PathBuf> = SYSROOT_SEARCH_DIRS.iter().map(|d| self.resolve(d)).collect();
        match std::env::join_paths(dirs) {
            Ok(search_path) => which::which_in(name, Some(search_path), &self.sysroot).is_ok(),
            Err(e) => {
                log::debug!("Could not build search path under {}: {}", self.sysroot.display(), e);
                false
            }
        }
    }

    fn command_output(&self, program: &str, args: &[&str]) -> Option<String> {
        let output = Command::new(program).args(args).output().ok()?;
        if !output.status.success() {
            log::debug!("{} {:?} exited with {}", program, args, output.status);
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            None
        } else {
            Some(stdout)
        }
    }

    fn invoking_user(&self) -> Option<String> {
        USER_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_markers_resolve_under_sysroot() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("etc")).unwrap();
        fs::write(temp.path().join("etc/debian_version"), "12.5\n").unwrap();

        let probe = SystemProbe::with_sysroot(temp.path());
        assert!(probe.path_exists("/etc/debian_version"));
        assert!(!probe.path_exists("/etc/fedora-release"));
        assert_eq!(
            probe.read_file("/etc/debian_version").as_deref(),
            Some("12.5\n")
        );
    }

    #[test]
    fn test_relative_paths_also_resolve_under_sysroot() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("run/openrc")).unwrap();

        let probe = SystemProbe::with_sysroot(temp.path());
        assert!(probe.path_exists("run/openrc"));
    }

    #[test]
    fn test_command_exists_for_nonexistent_command() {
        let probe = SystemProbe::new();
        assert!(!probe.command_exists("this_command_definitely_does_not_exist_12345"));
    }

    #[cfg(unix)]
    #[test]
    fn test_commands_resolve_under_sysroot() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("usr/bin")).unwrap();
        fs::create_dir_all(temp.path().join("usr/libexec/docker/cli-plugins")).unwrap();
        for name in ["usr/bin/docker", "usr/libexec/docker/cli-plugins/docker-compose"] {
            let path = temp.path().join(name);
            fs::write(&path, "#!/bin/sh\n").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let probe = SystemProbe::with_sysroot(temp.path());
        assert!(probe.command_exists("docker"));
        // Host tools outside the sysroot are not visible
        assert!(!probe.command_exists("sh"));
        assert!(probe.path_exists("/usr/libexec/docker/cli-plugins/docker-compose"));
    }

    #[test]
    fn test_command_output_of_missing_program_is_none() {
        let probe = SystemProbe::new();
        assert!(probe
            .command_output("this_command_definitely_does_not_exist_12345", &[])
            .is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_is_trimmed() {
        let probe = SystemProbe::new();
        assert_eq!(
            probe.command_output("sh", &["-c", "echo '  amd64  '"]).as_deref(),
            Some("amd64")
        );
        assert!(probe.command_output("sh", &["-c", "exit 3"]).is_none());
    }
}
