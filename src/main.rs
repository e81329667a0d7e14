mod cli;
mod commands;
mod libs;
mod logger;
mod schemas;

use std::process::ExitCode;

use chrono::Local;
use colored::Colorize;

use cli::cmd_enums::{Cli, parse_error_exit_code};
use commands::install::{self, Host, Outcome};
use libs::config_loading::load_defaults;
use libs::errors::BootstrapError;
use libs::latest_version::{LatestVersion, resolve_latest_version};
use libs::paths::resolve_host_paths;
use libs::privileges::{invoking_user, running_elevated};
use libs::signals::install_handlers;
use libs::utilities::command_runner::SystemRunner;
use libs::utilities::timestamps::{display_timestamp, format_duration};
use schemas::install_config::{PartialConfig, validate_and_finalize};

fn main() -> ExitCode {
    // Resolved before the flags are parsed; the lookup never fails the run.
    let latest = resolve_latest_version(|key| std::env::var(key).ok());

    let cli = match Cli::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => {
            // `--help` / `--version` land here too, on stdout with code 0.
            let _ = e.print();
            return exit_code(parse_error_exit_code(&e));
        }
    };
    let partial = cli.into_partial();
    logger::init(partial.verbose, partial.no_color);
    match &latest {
        LatestVersion::Published(version) => log_debug!("[PyPI] Latest FreeTAKServer release: {}", version),
        LatestVersion::Unavailable(reason) => log_debug!("[PyPI] Lookup failed: {}", reason),
    }

    match run(partial, &latest) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error!("{}", e.to_string().red());
            exit_code(e.exit_code())
        }
    }
}

fn run(partial: PartialConfig, latest: &LatestVersion) -> Result<(), BootstrapError> {
    let env = |key: &str| std::env::var(key).ok();
    let defaults = load_defaults(env)?;
    let config = validate_and_finalize(partial, &defaults, latest)?;

    let interrupt = install_handlers();
    let user = invoking_user(env);
    let paths = resolve_host_paths(&user, &defaults)?;
    let runner = SystemRunner::new(interrupt);
    let host = Host {
        runner: &runner,
        paths: &paths,
        user: &user,
        elevated: running_elevated(),
        interrupt,
    };

    let started = Local::now();
    log_info!(
        "Bootstrapping FreeTAKServer {} ({}) for {} at {}",
        config.fts_version.bold(),
        config.install_type,
        user.name.cyan(),
        display_timestamp(&started)
    );

    // The cleanup guard inside `install::run` has been dropped by the time this returns.
    let outcome = install::run(&config, &host)?;
    let elapsed = format_duration(&(Local::now() - started));

    match outcome {
        Outcome::Completed => log_info!(
            "{} in {}",
            "FreeTAKServer installation completed".green().bold(),
            elapsed
        ),
        Outcome::DryRun => log_info!(
            "{} in {}. Re-run without --dry-run to install.",
            "Dry run completed".green().bold(),
            elapsed
        ),
    }
    Ok(())
}

/// Maps a process status onto `ExitCode`. Statuses outside 0..=255 become 1.
fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map(ExitCode::from).unwrap_or(ExitCode::FAILURE)
}
