use clap::Parser;
use std::path::PathBuf;

/// Install Docker Engine and the compose plugin with the native package manager
#[derive(Parser, Debug)]
#[command(name = "dockup")]
#[command(author = "4n6h4x0r")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Detects the Linux distribution and init system, then installs and enables Docker",
    long_about = None
)]
pub struct Args {
    /// Print the commands that would run without executing them
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Only report the detected distribution, init system and installed components
    #[arg(long = "check", conflicts_with = "dry_run")]
    pub check: bool,

    /// Stop at the first failed installation step
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,

    /// Do not add the invoking user to the docker group
    #[arg(long = "no-group")]
    pub no_group: bool,

    /// Print the final report as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Resolve distribution marker files under this directory
    #[arg(long = "sysroot", env = "DOCKUP_SYSROOT", default_value = "/", hide = true)]
    pub sysroot: PathBuf,
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}
