// Our custom logging macros to give us nicely formatted (and colored!) output.
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::cli::type_enums::InstallType;
use crate::libs::errors::BootstrapError;
use crate::schemas::host::HostOs;

/// The Ubuntu release an install type is built and tested against:
/// `(VERSION_ID, codename)`.
fn supported_release(install_type: InstallType) -> (&'static str, &'static str) {
    match install_type {
        InstallType::Latest | InstallType::Stable => ("22.04", "jammy"),
        InstallType::Legacy => ("20.04", "focal"),
    }
}

/// Parses `os-release` formatted text into a key/value map.
/// Values may be bare, single- or double-quoted; comments and blank lines are skipped.
pub fn parse_os_release(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Detects the host OS and settles on the Ubuntu codename used for PPAs and the playbooks.
///
/// # Behaviour
/// * **Ubuntu**: codename taken from `VERSION_CODENAME`. A release other than the
///   one the install type targets only produces a warning.
/// * **Debian** (and derivatives such as Raspberry Pi OS): 11 and 12 map onto
///   `focal` and `jammy`; any other version warns and keeps the install type's codename.
/// * **Anything else**: [`BootstrapError::UnsupportedOs`], unless `dev_test` is set.
///
/// # Errors
/// [`BootstrapError::Io`] if `os-release` cannot be read, [`BootstrapError::UnsupportedOs`] as above.
pub fn detect_host_os(
    os_release: &Path,
    install_type: InstallType,
    dev_test: bool,
) -> Result<HostOs, BootstrapError> {
    let contents = fs::read_to_string(os_release)
        .map_err(|e| BootstrapError::io("failed to read", os_release, e))?;
    let fields = parse_os_release(&contents);
    let field = |key: &str| fields.get(key).cloned().unwrap_or_default();

    let id = field("ID").to_lowercase();
    let id_like = field("ID_LIKE").to_lowercase();
    let version_id = field("VERSION_ID");
    let pretty_name = Some(field("PRETTY_NAME"))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("{id} {version_id}"));
    let (supported_version, preset_codename) = supported_release(install_type);

    log_info!("Detected operating system: {}", pretty_name.cyan());
    log_debug!("[OS] ID={} ID_LIKE={} VERSION_ID={}", id, id_like, version_id);

    let codename = if id == "ubuntu" {
        if version_id != supported_version {
            log_warn!(
                "{} is not the release the '{}' install type targets (Ubuntu {}). Continuing anyway.",
                pretty_name.yellow(),
                install_type,
                supported_version
            );
        }
        Some(field("VERSION_CODENAME"))
            .filter(|codename| !codename.is_empty())
            .unwrap_or_else(|| preset_codename.to_string())
    } else if id == "debian" || id_like.split_whitespace().any(|like| like == "debian") {
        match version_id.as_str() {
            "11" => "focal".to_string(),
            "12" => "jammy".to_string(),
            other => {
                log_warn!(
                    "Unrecognized Debian version '{}'. Using codename '{}'.",
                    other.yellow(),
                    preset_codename
                );
                preset_codename.to_string()
            }
        }
    } else if dev_test {
        log_warn!(
            "{} is not a supported system; continuing because of --dev-test",
            pretty_name.yellow()
        );
        preset_codename.to_string()
    } else {
        return Err(BootstrapError::UnsupportedOs(pretty_name));
    };

    log_debug!("[OS] Using codename {}", codename.bold());
    Ok(HostOs {
        id,
        pretty_name,
        version_id,
        codename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const UBUNTU_2204: &str = r#"PRETTY_NAME="Ubuntu 22.04.4 LTS"
NAME="Ubuntu"
VERSION_ID="22.04"
VERSION_CODENAME=jammy
ID=ubuntu
ID_LIKE=debian
"#;

    fn detect(contents: &str, install_type: InstallType, dev_test: bool) -> Result<HostOs, BootstrapError> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("os-release");
        fs::write(&path, contents).unwrap();
        detect_host_os(&path, install_type, dev_test)
    }

    #[test]
    fn parses_quoted_and_bare_values() {
        let fields = parse_os_release("# comment\nID=ubuntu\nNAME='Ubuntu'\nPRETTY_NAME=\"Ubuntu 22.04\"\n\n");
        assert_eq!(fields["ID"], "ubuntu");
        assert_eq!(fields["NAME"], "Ubuntu");
        assert_eq!(fields["PRETTY_NAME"], "Ubuntu 22.04");
    }

    #[test]
    fn ubuntu_codename_is_taken_from_os_release() {
        let os = detect(UBUNTU_2204, InstallType::Latest, false).unwrap();
        assert!(os.is_ubuntu());
        assert_eq!(os.version_id, "22.04");
        assert_eq!(os.codename, "jammy");
        assert_eq!(os.pretty_name, "Ubuntu 22.04.4 LTS");
    }

    #[test]
    fn mismatched_ubuntu_release_is_only_a_warning() {
        let os = detect(UBUNTU_2204, InstallType::Legacy, false).unwrap();
        assert_eq!(os.codename, "jammy");
    }

    #[test]
    fn debian_versions_map_to_ubuntu_codenames() {
        let os = detect("ID=debian\nVERSION_ID=\"12\"\n", InstallType::Stable, false).unwrap();
        assert_eq!(os.codename, "jammy");
        let os = detect("ID=raspbian\nID_LIKE=debian\nVERSION_ID=\"11\"\n", InstallType::Stable, false).unwrap();
        assert_eq!(os.codename, "focal");
    }

    #[test]
    fn unrecognized_debian_version_keeps_the_preset_codename() {
        let os = detect("ID=debian\nVERSION_ID=\"13\"\n", InstallType::Legacy, false).unwrap();
        assert_eq!(os.codename, "focal");
        let os = detect("ID=debian\nVERSION_ID=\"10\"\n", InstallType::Latest, false).unwrap();
        assert_eq!(os.codename, "jammy");
    }

    #[test]
    fn non_debian_systems_are_rejected_unless_dev_testing() {
        let fedora = "ID=fedora\nVERSION_ID=40\nPRETTY_NAME=\"Fedora Linux 40\"\n";
        let err = detect(fedora, InstallType::Latest, false).unwrap_err();
        assert!(matches!(err, BootstrapError::UnsupportedOs(ref name) if name == "Fedora Linux 40"));

        let os = detect(fedora, InstallType::Latest, true).unwrap();
        assert_eq!(os.codename, "jammy");
    }

    #[test]
    fn unreadable_os_release_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = detect_host_os(&dir.path().join("missing"), InstallType::Latest, false).unwrap_err();
        assert!(matches!(err, BootstrapError::Io { .. }));
    }
}
