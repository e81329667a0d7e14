// This file resolves the newest FreeTAKServer release published on PyPI.
// The lookup runs once at startup, before the flags are parsed, and never
// fails the run: an unreachable index degrades the `latest` install type to
// the pinned stable release (see `schemas::install_config::resolve_versions`).

use std::time::Duration;

use anyhow::{Context, bail};

use crate::schemas::pypi::PypiProject;

/// PyPI JSON endpoint for the FreeTAKServer project.
const PYPI_PROJECT_URL: &str = "https://pypi.org/pypi/FreeTAKServer/json";

/// Environment variable that pins the "latest" version and skips the network call.
pub const LATEST_VERSION_ENV: &str = "FTS_LATEST_VERSION";

/// Upper bound on the whole request so `--help` never hangs on a dead network.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Outcome of the startup lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatestVersion {
    /// The version identifier PyPI reports as newest.
    Published(String),
    /// The lookup failed; holds a one-line reason for the warning.
    Unavailable(String),
}

impl LatestVersion {
    /// The published version, if the lookup succeeded.
    pub fn published(&self) -> Option<&str> {
        match self {
            LatestVersion::Published(version) => Some(version),
            LatestVersion::Unavailable(_) => None,
        }
    }
}

/// Resolves the latest FreeTAKServer version.
///
/// `FTS_LATEST_VERSION`, when set and non-empty, is used as-is. Otherwise the
/// PyPI JSON API is queried. Nothing is logged here: this runs before the
/// logger knows whether debug output is wanted.
pub fn resolve_latest_version<F>(env: F) -> LatestVersion
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(pinned) = pinned_version(env) {
        return LatestVersion::Published(pinned);
    }

    match fetch_latest_version() {
        Ok(version) => LatestVersion::Published(version),
        Err(e) => LatestVersion::Unavailable(format!("{e:#}")),
    }
}

fn pinned_version<F>(env: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(LATEST_VERSION_ENV)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Queries PyPI for the newest published release.
fn fetch_latest_version() -> anyhow::Result<String> {
    let agent = ureq::AgentBuilder::new()
        .user_agent(concat!("fts-bootstrap/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build();

    let body = agent
        .get(PYPI_PROJECT_URL)
        .call()
        .with_context(|| format!("GET {PYPI_PROJECT_URL}"))?
        .into_string()
        .context("reading PyPI response")?;

    parse_project_version(&body)
}

/// Extracts `info.version` from a PyPI project document.
pub fn parse_project_version(body: &str) -> anyhow::Result<String> {
    let project: PypiProject =
        serde_json::from_str(body).context("PyPI returned an unexpected document")?;
    let version = project.info.version.trim();
    if version.is_empty() {
        bail!("PyPI reported an empty version");
    }
    Ok(version.to_string())
}
