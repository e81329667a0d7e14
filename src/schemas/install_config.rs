//! # Install Configuration
//!
//! The configuration record a bootstrap run is driven by, and the two pure
//! steps that produce it:
//!
//! - [`resolve_versions`] maps an [`InstallType`] onto the Python runtime,
//!   FreeTAKServer version and configuration sub-path it implies.
//! - [`validate_and_finalize`] merges the parsed flags with environment and
//!   file defaults into an immutable [`InstallConfig`].
//!
//! Precedence is flags, then environment / defaults file (already merged into
//! [`BootstrapDefaults`]), then the built-in constants below.

use std::net::IpAddr;

use colored::Colorize;

use crate::cli::type_enums::InstallType;
use crate::libs::config_loading::BootstrapDefaults;
use crate::libs::errors::BootstrapError;
use crate::libs::latest_version::LatestVersion;
use crate::{log_debug, log_warn};

/// Repository holding the installation playbooks.
pub const DEFAULT_REPO_URL: &str = "https://github.com/FreeTAKTeam/FreeTAKHub-Installation.git";
/// Branch of [`DEFAULT_REPO_URL`] checked out unless overridden.
pub const DEFAULT_BRANCH: &str = "main";

/// FreeTAKServer release installed by `--stable`, and by `--latest` when PyPI is unreachable.
pub const STABLE_FTS_VERSION: &str = "2.0.66";
/// FreeTAKServer release installed by `--legacy`.
pub const LEGACY_FTS_VERSION: &str = "1.9.9.6";

const PY3_VER_STABLE: &str = "3.11";
const PY3_VER_LEGACY: &str = "3.8";

const CFG_RPATH_CORE: &str = "core/configuration";
const CFG_RPATH_CONTROLLERS: &str = "controllers/configuration";

/// The values an install type fully determines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionProfile {
    pub python_version: String,
    pub fts_version: String,
    pub config_relative_path: String,
}

/// Flags as parsed from the command line. `None` / `false` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialConfig {
    pub install_type: Option<InstallType>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub override_branch: Option<String>,
    pub ip_addr: Option<String>,
    pub dry_run: bool,
    pub core_only: bool,
    pub verbose: bool,
    pub check_mode: bool,
    pub dev_test: bool,
    pub no_color: bool,
}

/// The fully resolved configuration for one run.
///
/// Built once by [`validate_and_finalize`] and only read afterwards; the
/// orchestration step turns it into named parameters on the
/// `ansible-playbook` command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    pub install_type: InstallType,
    pub python_version: String,
    pub fts_version: String,
    pub config_relative_path: String,
    pub repo_url: String,
    /// `true` when the repository URL did not come from the built-in default.
    /// An existing checkout is discarded before cloning in that case.
    pub repo_overridden: bool,
    /// The branch that will be checked out. Already accounts for `override_branch`.
    pub branch: String,
    pub override_branch: Option<String>,
    pub ip_override: Option<String>,
    pub dry_run: bool,
    pub core_only: bool,
    pub verbose: bool,
    pub check_mode: bool,
    pub dev_test: bool,
    pub webmap_force_install: bool,
}

/// Looks up the version profile of an install type.
///
/// `latest` takes its FreeTAKServer version from the PyPI lookup done at
/// startup; when that lookup failed it falls back to [`STABLE_FTS_VERSION`].
pub fn resolve_versions(install_type: InstallType, latest: &LatestVersion) -> VersionProfile {
    let (python_version, fts_version, config_relative_path) = match install_type {
        InstallType::Latest => (
            PY3_VER_STABLE,
            latest.published().unwrap_or(STABLE_FTS_VERSION),
            CFG_RPATH_CORE,
        ),
        InstallType::Stable => (PY3_VER_STABLE, STABLE_FTS_VERSION, CFG_RPATH_CORE),
        InstallType::Legacy => (PY3_VER_LEGACY, LEGACY_FTS_VERSION, CFG_RPATH_CONTROLLERS),
    };

    VersionProfile {
        python_version: python_version.to_string(),
        fts_version: fts_version.to_string(),
        config_relative_path: config_relative_path.to_string(),
    }
}

/// Completes the parsed flags into an [`InstallConfig`].
///
/// # Errors
/// * [`BootstrapError::UnsupportedInstallType`] if the install type came from
///   `INSTALL_TYPE` or the defaults file and names no known type.
/// * [`BootstrapError::InvalidIpAddress`] if the IP override from the
///   environment or defaults file does not parse.
pub fn validate_and_finalize(
    partial: PartialConfig,
    defaults: &BootstrapDefaults,
    latest: &LatestVersion,
) -> Result<InstallConfig, BootstrapError> {
    let install_type = match (partial.install_type, defaults.install_type.as_deref()) {
        (Some(install_type), _) => install_type,
        (None, Some(raw)) => raw
            .parse::<InstallType>()
            .map_err(BootstrapError::UnsupportedInstallType)?,
        (None, None) => InstallType::DEFAULT,
    };

    if let (InstallType::Latest, LatestVersion::Unavailable(reason)) = (install_type, latest) {
        log_warn!(
            "Could not determine the latest FreeTAKServer release ({}). Falling back to stable {}.",
            reason,
            STABLE_FTS_VERSION.yellow()
        );
    }
    let profile = resolve_versions(install_type, latest);

    let explicit_repo = partial.repo.or_else(|| defaults.repo.clone());
    let repo_overridden = explicit_repo.is_some();
    let repo_url = explicit_repo.unwrap_or_else(|| DEFAULT_REPO_URL.to_string());

    // The override branch always beats --branch, whichever order they came in.
    let branch = partial
        .override_branch
        .clone()
        .or(partial.branch)
        .or_else(|| defaults.branch.clone())
        .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

    let ip_override = match partial.ip_addr.or_else(|| defaults.ip_addr.clone()) {
        Some(raw) => {
            let addr: IpAddr = raw
                .trim()
                .parse()
                .map_err(|_| BootstrapError::InvalidIpAddress(raw.clone()))?;
            Some(addr.to_string())
        }
        None => None,
    };

    let config = InstallConfig {
        install_type,
        python_version: profile.python_version,
        fts_version: profile.fts_version,
        config_relative_path: profile.config_relative_path,
        repo_url,
        repo_overridden,
        branch,
        override_branch: partial.override_branch,
        ip_override,
        dry_run: partial.dry_run,
        core_only: partial.core_only,
        verbose: partial.verbose,
        check_mode: partial.check_mode,
        dev_test: partial.dev_test,
        webmap_force_install: partial.dev_test,
    };
    log_debug!("Resolved install configuration: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn published(version: &str) -> LatestVersion {
        LatestVersion::Published(version.to_string())
    }

    #[test]
    fn each_install_type_maps_to_its_fixed_profile() {
        let latest = published("2.2.1");

        let profile = resolve_versions(InstallType::Latest, &latest);
        assert_eq!(profile.python_version, "3.11");
        assert_eq!(profile.fts_version, "2.2.1");
        assert_eq!(profile.config_relative_path, "core/configuration");

        let profile = resolve_versions(InstallType::Stable, &latest);
        assert_eq!(profile.python_version, "3.11");
        assert_eq!(profile.fts_version, STABLE_FTS_VERSION);
        assert_eq!(profile.config_relative_path, "core/configuration");

        let profile = resolve_versions(InstallType::Legacy, &latest);
        assert_eq!(profile.python_version, "3.8");
        assert_eq!(profile.fts_version, LEGACY_FTS_VERSION);
        assert_eq!(profile.config_relative_path, "controllers/configuration");
    }

    #[test]
    fn latest_falls_back_to_stable_when_pypi_is_unavailable() {
        let unavailable = LatestVersion::Unavailable("connection refused".into());
        let profile = resolve_versions(InstallType::Latest, &unavailable);
        assert_eq!(profile.fts_version, STABLE_FTS_VERSION);
    }

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let config =
            validate_and_finalize(PartialConfig::default(), &BootstrapDefaults::default(), &published("2.2.1"))
                .unwrap();
        assert_eq!(config.install_type, InstallType::Latest);
        assert_eq!(config.repo_url, DEFAULT_REPO_URL);
        assert!(!config.repo_overridden);
        assert_eq!(config.branch, DEFAULT_BRANCH);
        assert_eq!(config.ip_override, None);
        assert!(!config.webmap_force_install);
    }

    #[test]
    fn override_branch_wins_over_branch() {
        let partial = PartialConfig {
            branch: Some("main".into()),
            override_branch: Some("feature-x".into()),
            ..Default::default()
        };
        let config = validate_and_finalize(partial, &BootstrapDefaults::default(), &published("2.2.1")).unwrap();
        assert_eq!(config.branch, "feature-x");
        assert_eq!(config.override_branch.as_deref(), Some("feature-x"));
    }

    #[test]
    fn override_branch_wins_over_defaults_branch() {
        let defaults = BootstrapDefaults {
            branch: Some("dev".into()),
            ..Default::default()
        };
        let partial = PartialConfig {
            override_branch: Some("hotfix".into()),
            ..Default::default()
        };
        let config = validate_and_finalize(partial, &defaults, &published("2.2.1")).unwrap();
        assert_eq!(config.branch, "hotfix");
    }

    #[test]
    fn flag_install_type_beats_environment() {
        let defaults = BootstrapDefaults {
            install_type: Some("legacy".into()),
            ..Default::default()
        };
        let partial = PartialConfig {
            install_type: Some(InstallType::Stable),
            ..Default::default()
        };
        let config = validate_and_finalize(partial, &defaults, &published("2.2.1")).unwrap();
        assert_eq!(config.install_type, InstallType::Stable);

        let config = validate_and_finalize(PartialConfig::default(), &defaults, &published("2.2.1")).unwrap();
        assert_eq!(config.install_type, InstallType::Legacy);
        assert_eq!(config.python_version, "3.8");
    }

    #[test]
    fn unknown_install_type_is_rejected() {
        let defaults = BootstrapDefaults {
            install_type: Some("nightly".into()),
            ..Default::default()
        };
        let err = validate_and_finalize(PartialConfig::default(), &defaults, &published("2.2.1")).unwrap_err();
        assert!(matches!(err, BootstrapError::UnsupportedInstallType(ref raw) if raw == "nightly"));
    }

    #[test]
    fn explicit_repo_marks_the_checkout_stale() {
        let partial = PartialConfig {
            repo: Some("https://example.com/fork.git".into()),
            ..Default::default()
        };
        let config = validate_and_finalize(partial, &BootstrapDefaults::default(), &published("2.2.1")).unwrap();
        assert_eq!(config.repo_url, "https://example.com/fork.git");
        assert!(config.repo_overridden);

        let defaults = BootstrapDefaults {
            repo: Some("https://example.com/env.git".into()),
            ..Default::default()
        };
        let config = validate_and_finalize(PartialConfig::default(), &defaults, &published("2.2.1")).unwrap();
        assert!(config.repo_overridden);
    }

    #[test]
    fn ip_override_from_defaults_is_validated() {
        let defaults = BootstrapDefaults {
            ip_addr: Some("192.168.1.300".into()),
            ..Default::default()
        };
        let err = validate_and_finalize(PartialConfig::default(), &defaults, &published("2.2.1")).unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidIpAddress(_)));

        let defaults = BootstrapDefaults {
            ip_addr: Some(" 192.168.1.30 ".into()),
            ..Default::default()
        };
        let config = validate_and_finalize(PartialConfig::default(), &defaults, &published("2.2.1")).unwrap();
        assert_eq!(config.ip_override.as_deref(), Some("192.168.1.30"));
    }

    #[test]
    fn dev_test_forces_the_web_map() {
        let partial = PartialConfig {
            dev_test: true,
            ..Default::default()
        };
        let config = validate_and_finalize(partial, &BootstrapDefaults::default(), &published("2.2.1")).unwrap();
        assert!(config.webmap_force_install);
    }
}
