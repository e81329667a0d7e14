// Privilege checks and invoking-user lookup.
//
// The installer has to run as root (apt, /etc/sudoers.d), but the repository
// checkout, virtual environment and SSH key belong to the person who typed
// `sudo fts-bootstrap`. `SUDO_USER` tells us who that is.

use std::path::PathBuf;

use colored::Colorize;
use nix::unistd::{Uid, User};

use crate::libs::errors::BootstrapError;
use crate::schemas::host::InvokingUser;
use crate::{log_debug, log_info, log_warn};

/// Whether the process runs with an effective UID of 0.
pub fn running_elevated() -> bool {
    Uid::effective().is_root()
}

/// Fails fast unless the process is elevated.
///
/// # Arguments
/// * `elevated`: Result of [`running_elevated`] (injected so the sequencing can be tested).
pub fn ensure_elevated(elevated: bool) -> Result<(), BootstrapError> {
    if elevated {
        log_debug!("[Privileges] Running with root privileges");
        Ok(())
    } else {
        Err(BootstrapError::Privilege {
            program: env!("CARGO_PKG_NAME").to_string(),
        })
    }
}

/// Determines the user the installation is performed for.
///
/// `SUDO_USER` wins when it names someone other than root, then `USER`,
/// then root. The home directory comes from the passwd database, falling
/// back to `$HOME` and finally `/root`.
pub fn invoking_user<F>(env: F) -> InvokingUser
where
    F: Fn(&str) -> Option<String>,
{
    let name = env("SUDO_USER")
        .filter(|user| !user.is_empty() && user != "root")
        .or_else(|| env("USER").filter(|user| !user.is_empty()))
        .unwrap_or_else(|| "root".to_string());

    let home = match User::from_name(&name) {
        Ok(Some(user)) => user.dir,
        Ok(None) => {
            log_warn!("[Privileges] User '{}' not found in passwd database", name.yellow());
            fallback_home()
        }
        Err(e) => {
            log_warn!("[Privileges] Could not look up user '{}': {}", name.yellow(), e);
            fallback_home()
        }
    };

    log_info!(
        "Installing for user {} (home: {})",
        name.cyan(),
        home.display().to_string().cyan()
    );
    InvokingUser { name, home }
}

fn fallback_home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/root"))
}
