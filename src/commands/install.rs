// This file contains the sequencing logic of a bootstrap run.
// It takes the resolved configuration and walks the host through every
// preparation step, then hands over to the Ansible playbooks.
// The PyPI lookup and flag parsing already happened in `main`.

use colored::Colorize;

use crate::libs::cleanup::CleanupGuard;
use crate::libs::errors::BootstrapError;
use crate::libs::signals::InterruptFlag;
use crate::libs::utilities::command_runner::CommandRunner;
use crate::libs::{
    orchestrator::{playbook_for, run_playbook}, // Final step: ansible-playbook.
    os_detection::detect_host_os,         // Reads /etc/os-release.
    privileges::ensure_elevated,          // Root check.
    python_env::provision_virtualenv,     // Default install type only.
    repository::sync_repository,          // Clone or update the playbooks.
    ssh_keys::ensure_key_pair,            // ~/.ssh/id_rsa.
    sudoers::grant_passwordless_ansible,  // /etc/sudoers.d drop-in.
    summary::print_summary,               // Resolved configuration table.
    system_packages::install_prerequisites,
};
use crate::schemas::host::{HostPaths, InvokingUser};
use crate::schemas::install_config::InstallConfig;
use crate::{log_debug, log_info};

/// How a run that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The playbook ran to completion.
    Completed,
    /// `--dry-run`: everything up to the playbook was done.
    DryRun,
}

/// Everything about the machine a run needs besides the configuration.
pub struct Host<'a> {
    pub runner: &'a dyn CommandRunner,
    pub paths: &'a HostPaths,
    pub user: &'a InvokingUser,
    /// Whether the process runs as root.
    pub elevated: bool,
    pub interrupt: InterruptFlag,
}

/// Main entry point for an installation.
///
/// Steps, in order:
/// 1. Summary table (verbose or dry run)
/// 2. Privilege check
/// 3. OS detection
/// 4. System packages
/// 5. Virtual environment (default install type only)
/// 6. Playbook repository
/// 7. Sudoers drop-in
/// 8. SSH key pair
/// 9. `ansible-playbook`, unless this is a dry run
///
/// The cleanup guard lives for the whole function, so the parked
/// unattended-upgrades file is restored on success, on every error and
/// when a signal unwinds the run.
///
/// # Errors
/// The first failing step, or [`BootstrapError::Interrupted`] after SIGINT/SIGTERM.
pub fn run(config: &InstallConfig, host: &Host) -> Result<Outcome, BootstrapError> {
    log_debug!("Entered install::run()");
    let mut guard = CleanupGuard::new();

    if config.verbose || config.dry_run {
        print_summary(config, host.paths);
    }

    ensure_elevated(host.elevated)?;
    host.interrupt.check()?;

    let os = detect_host_os(&host.paths.os_release, config.install_type, config.dev_test)?;
    log_debug!("Using codename {}", os.codename);

    install_prerequisites(config, &os, host.paths, host.runner, &mut guard)?;
    log_debug!("Unattended-upgrade settings parked: {}", guard.is_holding());
    host.interrupt.check()?;

    if config.install_type.is_default() {
        provision_virtualenv(config, host.paths, host.runner)?;
        host.interrupt.check()?;
    } else {
        log_debug!("Install type '{}' uses the system Python, skipping the virtual environment", config.install_type);
    }

    sync_repository(config, host.paths, host.user, host.runner)?;
    host.interrupt.check()?;

    grant_passwordless_ansible(host.paths, host.user, host.runner)?;
    ensure_key_pair(host.paths, host.user, host.runner)?;
    host.interrupt.check()?;

    if config.dry_run {
        log_info!(
            "{} Host prepared; skipping {} (dry run)",
            "[Dry run]".yellow(),
            playbook_for(config)
        );
        return Ok(Outcome::DryRun);
    }

    run_playbook(config, &os, host.paths, host.runner)?;
    guard.restore();
    Ok(Outcome::Completed)
}
