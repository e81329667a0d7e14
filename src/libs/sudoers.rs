// Grants the invoking user passwordless execution of `ansible-playbook` through
// a sudoers drop-in. The rule is staged in a temporary file inside the drop-in
// directory, checked with `visudo`, and only then renamed into place.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use colored::Colorize;

use crate::libs::errors::BootstrapError;
use crate::libs::utilities::command_runner::{CommandRunner, ExternalCommand};
use crate::schemas::host::{HostPaths, InvokingUser};
use crate::{log_debug, log_error, log_info};

/// Absolute path of the orchestration executable the rule allows.
pub const ANSIBLE_PLAYBOOK_PATH: &str = "/usr/bin/ansible-playbook";

/// File name of the drop-in inside `/etc/sudoers.d`. No dots: sudo skips those.
const DROP_IN_NAME: &str = "fts_ansible";

/// Prefix of the staged copy. The dots keep sudo from ever reading it.
const STAGING_PREFIX: &str = ".fts_ansible.";

/// sudo refuses drop-ins that are group- or world-writable.
const DROP_IN_MODE: u32 = 0o440;

/// Location of the drop-in for the given layout.
pub fn drop_in_path(paths: &HostPaths) -> PathBuf {
    paths.sudoers_dir.join(DROP_IN_NAME)
}

/// The rule written for `user`.
pub fn sudoers_rule(user: &str) -> String {
    format!("{user} ALL=(ALL) NOPASSWD:{ANSIBLE_PLAYBOOK_PATH}\n")
}

/// Writes and validates the sudoers drop-in for the invoking user.
///
/// Root needs no rule, so nothing is written when root invoked the installer.
///
/// # Errors
/// An I/O error staging or renaming the file, or `visudo -cf` rejecting it.
/// A rejected rule never reaches the drop-in path, so it cannot break sudo
/// for everyone.
pub fn grant_passwordless_ansible(
    paths: &HostPaths,
    user: &InvokingUser,
    runner: &dyn CommandRunner,
) -> Result<(), BootstrapError> {
    if user.is_root() {
        log_debug!("[Sudoers] Invoked as root, no sudoers rule needed");
        return Ok(());
    }

    let drop_in = drop_in_path(paths);
    log_info!(
        "[Sudoers] Allowing {} to run {} without a password",
        user.name.cyan(),
        ANSIBLE_PLAYBOOK_PATH
    );

    fs::create_dir_all(&paths.sudoers_dir)
        .map_err(|e| BootstrapError::io("failed to create", &paths.sudoers_dir, e))?;

    // Dropped (and deleted) on every early return below.
    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(&paths.sudoers_dir)
        .map_err(|e| BootstrapError::io("failed to create a staging file in", &paths.sudoers_dir, e))?;
    let staged_path = staged.path().to_path_buf();
    staged
        .write_all(sudoers_rule(&user.name).as_bytes())
        .map_err(|e| BootstrapError::io("failed to write", &staged_path, e))?;
    staged
        .as_file()
        .set_permissions(fs::Permissions::from_mode(DROP_IN_MODE))
        .map_err(|e| BootstrapError::io("failed to set permissions on", &staged_path, e))?;

    if let Err(e) = runner.run(&ExternalCommand::new("visudo").args(["-c", "-f"]).arg(staged_path.to_string_lossy())) {
        log_error!(
            "[Sudoers] visudo rejected the rule for {}; {} left unchanged",
            user.name,
            drop_in.display().to_string().red()
        );
        return Err(e);
    }

    staged
        .persist(&drop_in)
        .map_err(|e| BootstrapError::io("failed to move the validated rule to", &drop_in, e.error))?;
    log_debug!("[Sudoers] Wrote {}", drop_in.display());
    Ok(())
}
