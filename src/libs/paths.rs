// Imports the `Colorize` trait for adding color to console output.
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::libs::config_loading::BootstrapDefaults;
use crate::libs::errors::BootstrapError;
use crate::log_debug;
use crate::schemas::host::{HostPaths, InvokingUser};

/// Resolves every location the run touches for `user`.
///
/// The checkout and virtual environment directories may be moved by the
/// defaults file; `~` in those values means the invoking user's home (not
/// root's, even under sudo) and `$VARS` are expanded from the environment.
///
/// # Errors
/// [`BootstrapError::Config`] if a path references an undefined variable.
pub fn resolve_host_paths(
    user: &InvokingUser,
    defaults: &BootstrapDefaults,
) -> Result<HostPaths, BootstrapError> {
    let config_source = defaults
        .source
        .clone()
        .unwrap_or_else(|| PathBuf::from("environment"));
    let mut paths = HostPaths::for_home(&user.home);

    if let Some(raw) = &defaults.checkout_dir {
        paths.checkout_dir = expand_user_path(raw, &user.home, &config_source)?;
    }
    if let Some(raw) = &defaults.venv_dir {
        paths.venv_dir = expand_user_path(raw, &user.home, &config_source)?;
    }

    log_debug!("Repository checkout: {}", paths.checkout_dir.display().to_string().cyan());
    log_debug!("Virtual environment: {}", paths.venv_dir.display().to_string().cyan());
    log_debug!("SSH key: {}", paths.ssh_private_key.display().to_string().cyan());
    Ok(paths)
}

/// Expands `~` against `home` and `$VARS` against the process environment.
fn expand_user_path(raw: &str, home: &Path, config_source: &Path) -> Result<PathBuf, BootstrapError> {
    let home = home.to_string_lossy();
    let expanded = shellexpand::full_with_context(raw, || Some(&*home), |var| {
        std::env::var(var).map(Some)
    })
    .map_err(|e| BootstrapError::Config {
        path: config_source.to_path_buf(),
        reason: format!("cannot expand '{raw}': {e}"),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}
