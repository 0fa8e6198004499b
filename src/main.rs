//! plugup - Main entry point.
//!
//! Checks the configured GitHub repository for a newer plugin release
//! and installs it in place on confirmation.
//!
//! Usage: plugup [OPTIONS]
//!
//! Options:
//!   --version, -v      Show version
//!   --check            Check for an update and exit
//!   --upgrade          Check and install without prompting further steps
//!   --yes, -y          Skip the confirmation prompt
//!   --config <path>    Use a specific config file
//!
//! With no options: check, then prompt to upgrade when one is available.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use plugup::config::Config;
use plugup::logging;
use plugup::update::{HttpClient, UpdateError, Updater};

/// Current version of plugup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();

    // Handle --version flag
    if args.iter().any(|a| a == "--version" || a == "-v") {
        println!("plugup v{}", VERSION);
        return;
    }

    let check_only = args.iter().any(|a| a == "--check");
    let upgrade_now = args.iter().any(|a| a == "--upgrade");
    let assume_yes = args.iter().any(|a| a == "--yes" || a == "-y");

    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_config_path);

    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Could not read config {}: {}", config_path.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = logging::init(&config.log_config) {
        eprintln!("Could not initialize logging: {}", e);
    }

    let client = match HttpClient::new(&config.user_agent, Some(config.timeout())) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };
    let transport = Arc::new(client);
    let mut updater = Updater::new(config.update_options(), transport);

    let check = match updater.check() {
        Ok(check) => check,
        Err(e) => {
            eprintln!("Update check failed: {}", e);
            process::exit(1);
        }
    };

    if !check.available {
        println!(
            "{} v{} is up to date.",
            config.repo.as_str(),
            config.version
        );
        return;
    }

    println!(
        "Update available: installed v{}, latest {}",
        config.version, check.latest_version
    );

    if check_only {
        return;
    }

    if !upgrade_now && !assume_yes && !confirm_upgrade() {
        println!("Run 'plugup --upgrade' to install it.");
        return;
    }

    println!("Installing {}...", check.latest_version);
    match updater.upgrade() {
        Ok(()) => {
            println!("Updated to {}.", check.latest_version);
        }
        Err(e) => {
            report_failure(&e);
            process::exit(1);
        }
    }
}

/// Asks for confirmation when stdin is interactive; declines otherwise.
fn confirm_upgrade() -> bool {
    if !atty::is(atty::Stream::Stdin) {
        return false;
    }

    eprint!("Update now? [Y/n] ");
    let _ = io::stderr().flush();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    let input = input.trim().to_lowercase();
    input.is_empty() || input == "y" || input == "yes"
}

/// Prints an upgrade failure; size-ceiling violations get the hard stop
/// they demand.
fn report_failure(error: &UpdateError) {
    if error.is_fatal() {
        eprintln!("Aborted: {}", error);
    } else {
        eprintln!("Upgrade failed: {}", error);
    }
}
