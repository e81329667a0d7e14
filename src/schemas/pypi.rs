// Response shapes of the PyPI JSON API (`https://pypi.org/pypi/<project>/json`).
// Only the fields the installer reads are modelled.
use serde::Deserialize;

/// Top-level project document.
#[derive(Debug, Deserialize)]
pub struct PypiProject {
    pub(crate) info: PypiInfo,
}

/// The `info` object; `version` is the newest non-yanked release.
#[derive(Debug, Deserialize)]
pub struct PypiInfo {
    pub(crate) version: String,
}
