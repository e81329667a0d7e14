//! # Playbook Orchestration
//!
//! The last step of a run: hand the resolved configuration to
//! `ansible-playbook`, which performs the actual FreeTAKServer installation
//! from the synchronized checkout.
//!
//! The configuration travels as `-e KEY=VALUE` extra variables. The playbook
//! runs against `localhost` over a local connection, as root.

use colored::Colorize;

use crate::libs::errors::BootstrapError;
use crate::libs::sudoers::ANSIBLE_PLAYBOOK_PATH;
use crate::libs::utilities::command_runner::{CommandRunner, ExternalCommand};
use crate::log_info;
use crate::schemas::host::{HostOs, HostPaths};
use crate::schemas::install_config::InstallConfig;

/// Installs every component (server, UI, web map, video, MQTT).
pub const FULL_PLAYBOOK: &str = "install_all.yml";
/// Installs the main server only (`--core`).
pub const CORE_PLAYBOOK: &str = "install_mainserver.yml";

/// Playbook selected by the `core_only` flag.
pub fn playbook_for(config: &InstallConfig) -> &'static str {
    if config.core_only { CORE_PLAYBOOK } else { FULL_PLAYBOOK }
}

/// The `-e` variables, in the order they appear on the command line.
pub fn extra_vars(config: &InstallConfig, os: &HostOs, paths: &HostPaths) -> Vec<(&'static str, String)> {
    let mut vars = vec![
        ("INSTALL_TYPE", config.install_type.to_string()),
        ("PY3_VER", config.python_version.clone()),
        ("FTS_VERSION", config.fts_version.clone()),
        ("CFG_RPATH", config.config_relative_path.clone()),
        ("WEBMAP_FORCE_INSTALL", u8::from(config.webmap_force_install).to_string()),
    ];
    if let Some(ip) = &config.ip_override {
        vars.push(("FTS_IP_ADDR", ip.clone()));
    }
    vars.push(("FTS_VENV", paths.venv_dir.to_string_lossy().into_owned()));
    vars.push(("OS_CODENAME", os.codename.clone()));
    vars
}

/// Builds the full `ansible-playbook` invocation.
pub fn playbook_command(config: &InstallConfig, os: &HostOs, paths: &HostPaths) -> ExternalCommand {
    let mut command = ExternalCommand::new(ANSIBLE_PLAYBOOK_PATH)
        .args(["-u", "root", "-i", "localhost,", "--connection=local"])
        .current_dir(&paths.checkout_dir);

    for (key, value) in extra_vars(config, os, paths) {
        command = command.arg("-e").arg(format!("{key}={value}"));
    }
    if config.check_mode {
        command = command.arg("--check");
    }
    if config.verbose {
        command = command
            .env("ANSIBLE_VERBOSITY", "3")
            .env("ANSIBLE_DISPLAY_ARGS_TO_STDOUT", "True");
    }
    command.arg(playbook_for(config))
}

/// Runs the selected playbook.
///
/// # Errors
/// [`BootstrapError::Playbook`] carrying `ansible-playbook`'s exit code,
/// which `main` hands through as the process exit code. Spawn failures and
/// interrupts are returned unchanged.
pub fn run_playbook(
    config: &InstallConfig,
    os: &HostOs,
    paths: &HostPaths,
    runner: &dyn CommandRunner,
) -> Result<(), BootstrapError> {
    let playbook = playbook_for(config);
    log_info!(
        "[Ansible] Running {} for FreeTAKServer {}{}",
        playbook.cyan(),
        config.fts_version.cyan(),
        if config.check_mode { " (check mode)" } else { "" }
    );
    runner
        .run(&playbook_command(config, os, paths))
        .map_err(|e| match e {
            BootstrapError::ExternalTool { command, code } => BootstrapError::Playbook { command, code },
            other => other,
        })?;
    log_info!("[Ansible] {}", "Playbook finished successfully".green());
    Ok(())
}
