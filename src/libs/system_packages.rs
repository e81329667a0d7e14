//! # System Package Installer
//!
//! Installs the OS packages the rest of the bootstrap needs (git, Ansible,
//! Python tooling, ssh-keygen) through `apt-get`.
//!
//! ## Workflow
//!
//! 1. **Park unattended-upgrade settings** - hands `20auto-upgrades` to the
//!    [`CleanupGuard`] so periodic upgrades cannot take the dpkg lock mid-run
//! 2. **Refresh indexes** - `apt-get update`
//! 3. **Install prerequisites** - one `apt-get install` for the fixed list
//! 4. **Python runtime** - for the default install type only: on Ubuntu the
//!    deadsnakes PPA is enabled, then `python<ver>` and its venv/dev packages
//!    are installed
//!
//! `apt-get install` of packages that are already present is a no-op, so the
//! step can be repeated safely.

use colored::Colorize;

use crate::libs::cleanup::CleanupGuard;
use crate::libs::errors::BootstrapError;
use crate::libs::utilities::command_runner::{CommandRunner, ExternalCommand};
use crate::schemas::host::{HostOs, HostPaths};
use crate::schemas::install_config::InstallConfig;
use crate::{log_debug, log_info};

/// Packages every install needs, whatever the install type.
pub const PREREQUISITE_PACKAGES: &[&str] = &[
    "software-properties-common",
    "ca-certificates",
    "git",
    "curl",
    "python3-pip",
    "python3-venv",
    "python3-apt",
    "ansible",
    "openssh-client",
    "sudo",
];

/// PPA providing newer Python interpreters on Ubuntu.
const DEADSNAKES_PPA: &str = "ppa:deadsnakes/ppa";

/// `apt-get` with the environment that keeps it from prompting.
fn apt_get() -> ExternalCommand {
    ExternalCommand::new("apt-get")
        .env("DEBIAN_FRONTEND", "noninteractive")
        .env("NEEDRESTART_MODE", "a")
}

fn apt_install<I, S>(packages: I) -> ExternalCommand
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    apt_get()
        .args(["install", "-y", "--no-install-recommends"])
        .args(packages)
}

/// Python interpreter packages for `python_version` (e.g. `python3.11`, `python3.11-venv`).
pub fn python_runtime_packages(python_version: &str) -> Vec<String> {
    let interpreter = format!("python{python_version}");
    vec![
        interpreter.clone(),
        format!("{interpreter}-venv"),
        format!("{interpreter}-dev"),
    ]
}

/// Installs the OS-level prerequisites.
///
/// # Errors
/// Propagates the first failing `apt-get` / `add-apt-repository` invocation,
/// or an I/O error while parking the unattended-upgrades file.
pub fn install_prerequisites(
    config: &InstallConfig,
    os: &HostOs,
    paths: &HostPaths,
    runner: &dyn CommandRunner,
    guard: &mut CleanupGuard,
) -> Result<(), BootstrapError> {
    log_info!("[Packages] Installing system prerequisites");
    guard.relocate(&paths.auto_upgrades)?;

    runner.run(&apt_get().arg("update"))?;
    runner.run(&apt_install(PREREQUISITE_PACKAGES.iter().copied()))?;

    if config.install_type.is_default() {
        if os.is_ubuntu() {
            log_debug!("[Packages] Enabling {} for python{}", DEADSNAKES_PPA, config.python_version);
            runner.run(
                &ExternalCommand::new("add-apt-repository")
                    .args(["-y", DEADSNAKES_PPA])
                    .env("DEBIAN_FRONTEND", "noninteractive"),
            )?;
            runner.run(&apt_get().arg("update"))?;
        }
        runner.run(&apt_install(python_runtime_packages(&config.python_version)))?;
    }

    log_info!("[Packages] {}", "System prerequisites are installed".green());
    Ok(())
}
