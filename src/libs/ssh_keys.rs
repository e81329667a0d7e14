// Generates the SSH key pair the playbooks use to reach the host,
// unless the invoking user already has one.

use colored::Colorize;

use crate::libs::errors::BootstrapError;
use crate::libs::utilities::command_runner::{CommandRunner, ExternalCommand};
use crate::schemas::host::{HostPaths, InvokingUser};
use crate::{log_debug, log_info};

/// Creates `~/.ssh/id_rsa` (and `.pub`) for the invoking user if missing.
///
/// Both commands run as the invoking user so the key ends up owned by them.
pub fn ensure_key_pair(
    paths: &HostPaths,
    user: &InvokingUser,
    runner: &dyn CommandRunner,
) -> Result<(), BootstrapError> {
    let key = &paths.ssh_private_key;
    if key.exists() {
        log_debug!("[SSH] Key pair already present at {}", key.display());
        return Ok(());
    }

    log_info!("[SSH] Generating key pair {}", key.display().to_string().cyan());
    if let Some(ssh_dir) = key.parent() {
        runner.run(
            &ExternalCommand::new("mkdir")
                .args(["-p", "-m", "700"])
                .arg(ssh_dir.to_string_lossy())
                .run_as(&user.name),
        )?;
    }
    runner.run(
        &ExternalCommand::new("ssh-keygen")
            .args(["-q", "-t", "rsa", "-b", "4096", "-N", "", "-f"])
            .arg(key.to_string_lossy())
            .run_as(&user.name),
    )
}
