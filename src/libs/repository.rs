//! # Installation Repository
//!
//! Keeps the working copy of the FreeTAKHub-Installation repository (the
//! Ansible playbooks) at the resolved branch.
//!
//! - No checkout yet: `git clone --branch <branch> <repo> <dir>`
//! - Checkout present: `git fetch --all --tags` then `git checkout <branch>`
//! - Repository URL overridden: an existing checkout may track a different
//!   remote, so it is deleted and cloned again
//! - Anything else at the checkout path (a non-empty directory without
//!   `.git`, or a file) is left untouched and reported as an error
//!
//! git runs as the invoking user so the checkout stays owned by them.

use std::fs;
use std::io;
use std::path::Path;

use colored::Colorize;

use crate::libs::errors::BootstrapError;
use crate::libs::utilities::command_runner::{CommandRunner, ExternalCommand};
use crate::schemas::host::{HostPaths, InvokingUser};
use crate::schemas::install_config::InstallConfig;
use crate::{log_debug, log_info, log_warn};

/// Clones or updates the installation repository.
///
/// # Errors
/// A failing git invocation, an I/O error while discarding a stale checkout,
/// or [`BootstrapError::Io`] when the checkout path is occupied by something
/// that is not a git checkout.
pub fn sync_repository(
    config: &InstallConfig,
    paths: &HostPaths,
    user: &InvokingUser,
    runner: &dyn CommandRunner,
) -> Result<(), BootstrapError> {
    let checkout = &paths.checkout_dir;
    log_info!(
        "[Repository] {} @ {} -> {}",
        config.repo_url.cyan(),
        config.branch.cyan(),
        checkout.display().to_string().cyan()
    );

    if config.repo_overridden && checkout.exists() {
        log_warn!(
            "[Repository] Repository overridden; removing existing checkout {}",
            checkout.display().to_string().yellow()
        );
        fs::remove_dir_all(checkout).map_err(|e| BootstrapError::io("failed to remove", checkout, e))?;
    }

    let checkout_str = checkout.to_string_lossy().into_owned();
    if checkout.join(".git").is_dir() {
        log_debug!("[Repository] Existing checkout found, updating");
        let git = || {
            ExternalCommand::new("git")
                .args(["-C", checkout_str.as_str()])
                .run_as(&user.name)
        };
        runner.run(&git().args(["fetch", "--all", "--tags", "--prune"]))?;
        runner.run(&git().args(["checkout", config.branch.as_str()]))?;
    } else {
        ensure_clone_target_is_free(checkout)?;
        runner.run(
            &ExternalCommand::new("git")
                .args([
                    "clone",
                    "--branch",
                    config.branch.as_str(),
                    config.repo_url.as_str(),
                    checkout_str.as_str(),
                ])
                .run_as(&user.name),
        )?;
    }

    log_info!("[Repository] {}", "Installation playbooks are up to date".green());
    Ok(())
}

/// `git clone` only writes into a missing or empty directory. Anything else
/// at that path may be the user's data and is never removed.
fn ensure_clone_target_is_free(checkout: &Path) -> Result<(), BootstrapError> {
    if !checkout.exists() {
        return Ok(());
    }
    let empty_dir = checkout.is_dir()
        && fs::read_dir(checkout)
            .map_err(|e| BootstrapError::io("failed to read", checkout, e))?
            .next()
            .is_none();
    if empty_dir {
        log_debug!("[Repository] {} is empty, cloning into it", checkout.display());
        return Ok(());
    }

    log_warn!(
        "[Repository] {} exists but is not a git checkout; move it away or set checkout_dir",
        checkout.display().to_string().yellow()
    );
    Err(BootstrapError::io(
        "refusing to clone into",
        checkout,
        io::Error::new(io::ErrorKind::AlreadyExists, "path exists and is not a git checkout"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::config_loading::BootstrapDefaults;
    use crate::libs::latest_version::LatestVersion;
    use crate::libs::utilities::command_runner::testing::RecordingRunner;
    use crate::schemas::install_config::{PartialConfig, validate_and_finalize};
    use tempfile::TempDir;

    fn config(partial: PartialConfig) -> InstallConfig {
        validate_and_finalize(
            partial,
            &BootstrapDefaults::default(),
            &LatestVersion::Published("2.2.1".into()),
        )
        .unwrap()
    }

    fn user(paths: &HostPaths) -> InvokingUser {
        InvokingUser {
            name: "fts".into(),
            home: paths.home.clone(),
        }
    }

    #[test]
    fn clones_when_absent() {
        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under(dir.path());
        let runner = RecordingRunner::new();

        sync_repository(&config(PartialConfig::default()), &paths, &user(&paths), &runner).unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].args[..3], ["clone", "--branch", "main"]);
        assert!(commands[0].has_arg("https://github.com/FreeTAKTeam/FreeTAKHub-Installation.git"));
        assert_eq!(commands[0].run_as.as_deref(), Some("fts"));
    }

    #[test]
    fn updates_an_existing_checkout_at_the_override_branch() {
        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under(dir.path());
        fs::create_dir_all(paths.checkout_dir.join(".git")).unwrap();
        let runner = RecordingRunner::new();
        let partial = PartialConfig {
            branch: Some("main".into()),
            override_branch: Some("feature-x".into()),
            ..Default::default()
        };

        sync_repository(&config(partial), &paths, &user(&paths), &runner).unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 2);
        assert!(commands[0].has_arg("fetch"));
        assert_eq!(commands[1].args[2..], ["checkout", "feature-x"]);
        assert!(paths.checkout_dir.exists());
    }

    #[test]
    fn repo_override_discards_the_previous_checkout() {
        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under(dir.path());
        fs::create_dir_all(paths.checkout_dir.join(".git")).unwrap();
        fs::write(paths.checkout_dir.join("stale.yml"), "").unwrap();
        let runner = RecordingRunner::new();
        let partial = PartialConfig {
            repo: Some("https://example.com/fork.git".into()),
            ..Default::default()
        };

        sync_repository(&config(partial), &paths, &user(&paths), &runner).unwrap();

        assert!(!paths.checkout_dir.join("stale.yml").exists());
        let commands = runner.commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].has_arg("clone"));
        assert!(commands[0].has_arg("https://example.com/fork.git"));
    }

    #[test]
    fn non_git_directory_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under(dir.path());
        fs::create_dir_all(&paths.checkout_dir).unwrap();
        let notes = paths.checkout_dir.join("my-notes.txt");
        fs::write(&notes, "keep me").unwrap();
        let runner = RecordingRunner::new();

        let err = sync_repository(&config(PartialConfig::default()), &paths, &user(&paths), &runner).unwrap_err();

        assert!(matches!(err, BootstrapError::Io { ref path, .. } if *path == paths.checkout_dir));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(fs::read_to_string(&notes).unwrap(), "keep me");
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn empty_directory_is_cloned_into() {
        let dir = TempDir::new().unwrap();
        let paths = HostPaths::under(dir.path());
        fs::create_dir_all(&paths.checkout_dir).unwrap();
        let runner = RecordingRunner::new();

        sync_repository(&config(PartialConfig::default()), &paths, &user(&paths), &runner).unwrap();

        assert!(paths.checkout_dir.exists());
        assert!(runner.commands()[0].has_arg("clone"));
    }
}
