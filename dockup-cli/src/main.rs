use anyhow::Result;
use dockup_core::{
    CheckReport, Distribution, FailurePolicy, InstallConfig, InstallReport, InstallationOutcome,
    ProgressCallback,
};
use std::io::Write;

mod cli;

fn main() -> Result<()> {
    let args = cli::parse_args();

    // Initialize logger with appropriate level based on verbose flag
    if std::env::var("RUST_LOG").is_err() {
        if args.verbose {
            std::env::set_var("RUST_LOG", "debug");
        } else {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let config = InstallConfig {
        sysroot: args.sysroot.clone(),
        dry_run: args.dry_run,
        failure_policy: if args.fail_fast {
            FailurePolicy::Halt
        } else {
            FailurePolicy::Continue
        },
        manage_group: !args.no_group,
        ..InstallConfig::default()
    };

    if args.check {
        let report = dockup_core::check(&config);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_check(&report);
        }
        return Ok(());
    }

    if !args.json {
        println!("=== DOCKUP CONTAINER RUNTIME INSTALLER ===");
        println!("Version: {}", env!("CARGO_PKG_VERSION"));
        println!("==========================================\n");
    }

    // Keep stdout clean for the JSON report
    let json = args.json;
    let progress: ProgressCallback = Box::new(move |msg: &str, pct: u8| {
        if json {
            eprintln!("[{}%] {}", pct, msg);
        } else {
            println!("[{}%] {}", pct, msg);
            std::io::stdout().flush().ok();
        }
    });

    match dockup_core::install(&config, Some(progress)) {
        Ok(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("\n❌ {}", e);
            if let Some(path) = e.log_file() {
                eprintln!("Full command output saved to: {}", path.display());
            }
            std::process::exit(e.exit_code());
        }
    }
}

fn print_report(report: &InstallReport) {
    println!();
    println!("Distribution: {}", report.distribution);
    print_package_manager(&report.distribution);
    println!("Init system:  {}", report.init_system);
    println!("Elevation:    {}", report.elevation);

    if report.dry_run {
        println!("\nPlanned commands:");
        for step in &report.steps {
            match &step.command {
                Some(command) => println!("  $ {}", command),
                None => println!("  ! {} ({})", step.description, step.failure_detail().unwrap_or_default()),
            }
        }
    }

    let failed: Vec<_> = report.failed_steps().collect();
    if !failed.is_empty() {
        println!("\n⚠️  {} step(s) failed:", failed.len());
        for step in failed {
            println!(
                "  ✗ {} - {}",
                step.description,
                step.failure_detail().unwrap_or_default()
            );
        }
    }

    for note in &report.notes {
        println!("\nℹ️  {}", note);
    }

    if let Some(path) = &report.log_file {
        println!("\nFull command output saved to: {}", path.display());
    }

    print_missing(&report.outcome);
    println!("\n{}", report.outcome.status_line());
}

fn print_check(report: &CheckReport) {
    println!("Distribution: {}", report.distribution);
    print_package_manager(&report.distribution);
    println!("Init system:  {}", report.init_system);
    match report.elevation {
        Some(mode) => println!("Elevation:    {}", mode),
        None => println!("Elevation:    unavailable (neither sudo nor doas found)"),
    }
    if !report.distribution.is_supported() {
        println!("\n⚠️  This distribution is not supported by the installer");
    }
    print_missing(&report.outcome);
    println!("\n{}", report.outcome.status_line());
}

fn print_package_manager(distribution: &Distribution) {
    if let Some(manager) = distribution.package_manager() {
        println!("Packages via: {}", manager);
    }
}

fn print_missing(outcome: &InstallationOutcome) {
    let missing = outcome.missing();
    if missing.is_empty() {
        return;
    }
    println!("\nMissing components:");
    for component in missing {
        println!("  • {} - {}", component.name(), component.description());
    }
}
