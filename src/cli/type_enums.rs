use std::fmt;
use std::str::FromStr;

/// The release channel to install.
/// Each variant pins the Python runtime, the FreeTAKServer version and the
/// configuration sub-path used by the playbooks (see `schemas::install_config`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallType {
    Latest, // Newest FreeTAKServer release published on PyPI
    Stable, // Pinned, known-good release
    Legacy, // Last release of the 1.x line, for Ubuntu 20.04 hosts
}

impl InstallType {
    /// The install type used when neither a flag, `INSTALL_TYPE` nor the defaults file picks one.
    pub const DEFAULT: InstallType = InstallType::Latest;

    #[cfg(test)]
    pub const ALL: [InstallType; 3] = [InstallType::Latest, InstallType::Stable, InstallType::Legacy];

    /// Whether this is the default install type.
    /// Only the default install type gets a dedicated virtual environment.
    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }
}

/// Implementation of string parsing for InstallType enum.
/// Used for the `INSTALL_TYPE` environment variable and the `install_type` key
/// of the defaults file; the flags themselves never go through here.
impl FromStr for InstallType {
    type Err = String;

    /// Parses a string into an InstallType variant (case-insensitive, surrounding whitespace ignored).
    ///
    /// # Returns
    /// * `Ok(InstallType)` if the string names a known install type
    /// * `Err(String)` holding the rejected input otherwise
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest" => Ok(InstallType::Latest),
            "stable" => Ok(InstallType::Stable),
            "legacy" => Ok(InstallType::Legacy),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for InstallType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InstallType::Latest => write!(f, "latest"),
            InstallType::Stable => write!(f, "stable"),
            InstallType::Legacy => write!(f, "legacy"),
        }
    }
}
