use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use serde::Deserialize;

use crate::libs::errors::BootstrapError;
use crate::{log_debug, log_info};

/// Environment variable naming an alternative defaults file.
pub const CONFIG_PATH_ENV: &str = "FTS_BOOTSTRAP_CONFIG";
/// Defaults file read when `FTS_BOOTSTRAP_CONFIG` is not set. Optional.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/fts-bootstrap/config.yaml";

/// Environment variables that override the defaults file, keyed by field.
const INSTALL_TYPE_ENV: &str = "INSTALL_TYPE";
const REPO_ENV: &str = "FTS_REPO";
const BRANCH_ENV: &str = "FTS_BRANCH";
const IP_ADDR_ENV: &str = "FTS_IP_ADDR";

/// Site defaults that sit between the command-line flags and the built-in constants.
///
/// Values are kept as raw strings: `install_type` and `ip_addr` are validated
/// by `validate_and_finalize`, the directories are expanded by `libs::paths`.
///
/// ```yaml
/// install_type: stable
/// repo: https://github.com/example/FreeTAKHub-Installation.git
/// branch: main
/// ip_addr: 10.0.0.5
/// checkout_dir: ~/src/FreeTAKHub-Installation
/// venv_dir: /opt/fts.venv
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapDefaults {
    pub install_type: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub ip_addr: Option<String>,
    pub checkout_dir: Option<String>,
    pub venv_dir: Option<String>,
    /// File the values were read from, for error messages.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Loads the defaults file (if any) and lays the environment on top of it.
///
/// # Arguments
/// * `env`: Environment lookup; `main` passes `std::env::var`, tests pass a map.
///
/// # Errors
/// [`BootstrapError::Config`] when the file named by `FTS_BOOTSTRAP_CONFIG`
/// does not exist, or when any defaults file cannot be read or parsed.
pub fn load_defaults<F>(env: F) -> Result<BootstrapDefaults, BootstrapError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let mut defaults = match lookup(CONFIG_PATH_ENV) {
        Some(explicit) => {
            let path = PathBuf::from(explicit);
            if !path.exists() {
                return Err(BootstrapError::Config {
                    path,
                    reason: format!("file named by {CONFIG_PATH_ENV} does not exist"),
                });
            }
            load_defaults_file(&path)?
        }
        None => {
            let path = Path::new(SYSTEM_CONFIG_PATH);
            if path.exists() {
                load_defaults_file(path)?
            } else {
                log_debug!("No defaults file at {}, using built-in defaults", SYSTEM_CONFIG_PATH);
                BootstrapDefaults::default()
            }
        }
    };

    overlay(&mut defaults.install_type, lookup(INSTALL_TYPE_ENV));
    overlay(&mut defaults.repo, lookup(REPO_ENV));
    overlay(&mut defaults.branch, lookup(BRANCH_ENV));
    overlay(&mut defaults.ip_addr, lookup(IP_ADDR_ENV));

    log_debug!("Effective defaults: {:?}", defaults);
    Ok(defaults)
}

fn overlay(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Reads and parses one YAML defaults file. An empty file means "no defaults".
fn load_defaults_file(path: &Path) -> Result<BootstrapDefaults, BootstrapError> {
    parse_defaults_file(path).map_err(|e| BootstrapError::Config {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })
}

fn parse_defaults_file(path: &Path) -> anyhow::Result<BootstrapDefaults> {
    let contents = fs::read_to_string(path).context("could not read file")?;
    if contents.trim().is_empty() {
        return Ok(BootstrapDefaults {
            source: Some(path.to_path_buf()),
            ..Default::default()
        });
    }
    let mut defaults: BootstrapDefaults =
        serde_yaml::from_str(&contents).context("please check its YAML syntax")?;
    defaults.source = Some(path.to_path_buf());
    log_info!("Using defaults file: {}", path.display().to_string().cyan());
    Ok(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "install_type: stable\nbranch: dev\nvenv_dir: /opt/fts.venv\n").unwrap();

        let defaults = load_defaults(env_from(&[(CONFIG_PATH_ENV, path.to_str().unwrap())])).unwrap();
        assert_eq!(defaults.install_type.as_deref(), Some("stable"));
        assert_eq!(defaults.branch.as_deref(), Some("dev"));
        assert_eq!(defaults.venv_dir.as_deref(), Some("/opt/fts.venv"));
        assert_eq!(defaults.repo, None);
    }

    #[test]
    fn environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "install_type: stable\nrepo: https://example.com/file.git\n").unwrap();

        let defaults = load_defaults(env_from(&[
            (CONFIG_PATH_ENV, path.to_str().unwrap()),
            ("INSTALL_TYPE", "legacy"),
            ("FTS_BRANCH", "  "),
        ]))
        .unwrap();
        assert_eq!(defaults.install_type.as_deref(), Some("legacy"));
        assert_eq!(defaults.repo.as_deref(), Some("https://example.com/file.git"));
        // Blank environment values are ignored.
        assert_eq!(defaults.branch, None);
    }

    #[test]
    fn empty_file_means_no_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "\n").unwrap();
        let defaults = load_defaults(env_from(&[(CONFIG_PATH_ENV, path.to_str().unwrap())])).unwrap();
        assert_eq!(defaults.install_type, None);
        assert_eq!(defaults.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "instal_type: stable\n").unwrap();
        let err = load_defaults(env_from(&[(CONFIG_PATH_ENV, path.to_str().unwrap())])).unwrap_err();
        assert!(matches!(err, BootstrapError::Config { .. }));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.yaml");
        let err = load_defaults(env_from(&[(CONFIG_PATH_ENV, path.to_str().unwrap())])).unwrap_err();
        assert!(matches!(err, BootstrapError::Config { .. }));
    }
}
