//! # Cleanup Guard
//!
//! While packages are installed, the APT periodic-upgrade settings file is
//! parked next to itself so unattended upgrades cannot grab the dpkg lock in
//! the middle of the run. [`CleanupGuard`] owns that relocation and puts the
//! file back exactly once: explicitly via [`CleanupGuard::restore`], or from
//! `Drop` on every other exit path (error, dry-run return, interrupt unwind).

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::libs::errors::BootstrapError;
use crate::{log_debug, log_error, log_info};

/// Suffix for the parked copy. APT silently ignores `*.bak` in `apt.conf.d`.
const PARKED_SUFFIX: &str = ".fts-bootstrap.bak";

#[derive(Debug)]
struct RelocatedFile {
    original: PathBuf,
    parked: PathBuf,
}

/// Restores a temporarily relocated system file when dropped.
#[derive(Debug, Default)]
pub struct CleanupGuard {
    relocated: Option<RelocatedFile>,
}

/// Where `original` is parked while the run is in progress.
pub fn parked_path(original: &Path) -> PathBuf {
    let mut name: OsString = original.file_name().map(OsString::from).unwrap_or_default();
    name.push(PARKED_SUFFIX);
    original.with_file_name(name)
}

impl CleanupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves `original` aside until the guard restores it.
    ///
    /// A parked copy left behind by a previous run that was killed outright
    /// is adopted, so this run puts it back. Relocating while something is
    /// already relocated is a no-op.
    pub fn relocate(&mut self, original: &Path) -> Result<(), BootstrapError> {
        if self.relocated.is_some() {
            return Ok(());
        }
        let parked = parked_path(original);

        if parked.exists() && !original.exists() {
            log_info!(
                "[Cleanup] Found {} from an earlier run; it will be restored when this run ends",
                parked.display().to_string().yellow()
            );
        } else if original.exists() {
            fs::rename(original, &parked)
                .map_err(|e| BootstrapError::io("failed to move aside", original, e))?;
            log_debug!(
                "[Cleanup] Moved {} to {}",
                original.display(),
                parked.display()
            );
        } else {
            log_debug!("[Cleanup] {} does not exist, nothing to move aside", original.display());
            return Ok(());
        }

        self.relocated = Some(RelocatedFile {
            original: original.to_path_buf(),
            parked,
        });
        Ok(())
    }

    /// Whether a file is currently parked.
    pub fn is_holding(&self) -> bool {
        self.relocated.is_some()
    }

    /// Puts the parked file back. Later calls (and the eventual drop) do nothing.
    pub fn restore(&mut self) {
        let Some(relocated) = self.relocated.take() else {
            return;
        };
        match fs::rename(&relocated.parked, &relocated.original) {
            Ok(()) => log_info!(
                "[Cleanup] Restored {}",
                relocated.original.display().to_string().green()
            ),
            Err(e) => log_error!(
                "[Cleanup] Could not restore {} from {}: {}. Move it back by hand.",
                relocated.original.display().to_string().red(),
                relocated.parked.display(),
                e
            ),
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.restore();
    }
}
