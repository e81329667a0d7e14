// This module provisions the dedicated Python virtual environment used by the
// default install type, and installs the Python libraries the playbooks'
// helper scripts import into it.

use colored::Colorize;

use crate::libs::errors::BootstrapError;
use crate::libs::utilities::command_runner::{CommandRunner, ExternalCommand};
use crate::schemas::host::HostPaths;
use crate::schemas::install_config::InstallConfig;
use crate::{log_debug, log_info};

/// Packaging tools upgraded first, so the library installs below get wheels.
const PIP_BOOTSTRAP_PACKAGES: &[&str] = &["pip", "setuptools", "wheel"];

/// Libraries installed into the environment.
pub const VENV_PACKAGES: &[&str] = &["jinja2", "pyyaml", "psutil"];

/// Creates (if needed) and populates the virtual environment.
///
/// # Workflow
/// 1. `python<ver> -m venv <dir>` unless `<dir>/bin/python` already exists
/// 2. `<dir>/bin/python -m pip install --upgrade pip setuptools wheel`
/// 3. `<dir>/bin/python -m pip install jinja2 pyyaml psutil`
///
/// # Errors
/// The first failing interpreter / pip invocation.
pub fn provision_virtualenv(
    config: &InstallConfig,
    paths: &HostPaths,
    runner: &dyn CommandRunner,
) -> Result<(), BootstrapError> {
    log_info!(
        "[Python] Preparing virtual environment {} (python{})",
        paths.venv_dir.display().to_string().cyan(),
        config.python_version
    );

    let venv_python = paths.venv_python();
    if venv_python.exists() {
        log_debug!("[Python] {} exists, reusing the environment", venv_python.display());
    } else {
        runner.run(
            &ExternalCommand::new(format!("python{}", config.python_version))
                .args(["-m", "venv"])
                .arg(paths.venv_dir.to_string_lossy()),
        )?;
    }

    let pip = || {
        ExternalCommand::new(venv_python.to_string_lossy())
            .args(["-m", "pip", "install", "--disable-pip-version-check"])
    };
    runner.run(&pip().arg("--upgrade").args(PIP_BOOTSTRAP_PACKAGES.iter().copied()))?;
    runner.run(&pip().args(VENV_PACKAGES.iter().copied()))?;

    log_info!("[Python] {}", "Virtual environment is ready".green());
    Ok(())
}
