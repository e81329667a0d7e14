// Data structures describing the machine being bootstrapped:
// who invoked the installer, where everything lives on disk, and which OS it runs.

use std::path::{Path, PathBuf};

/// Name of the installation repository checkout inside the invoking user's home.
pub const CHECKOUT_DIR_NAME: &str = "FreeTAKHub-Installation";
/// Name of the virtual environment directory inside the invoking user's home.
pub const VENV_DIR_NAME: &str = "fts.venv";

/// The account that asked for the installation.
/// Under `sudo` this is `SUDO_USER`, not root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokingUser {
    pub name: String,
    pub home: PathBuf,
}

impl InvokingUser {
    /// Whether the installer was started from a root shell rather than through sudo.
    pub fn is_root(&self) -> bool {
        self.name == "root"
    }
}

/// Every filesystem location a bootstrap run reads or writes.
/// Resolved once in `libs::paths`; tests point these into a temporary directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPaths {
    /// `/etc/os-release`
    pub os_release: PathBuf,
    /// `/etc/sudoers.d`
    pub sudoers_dir: PathBuf,
    /// APT periodic-upgrade settings, parked while packages are installed.
    pub auto_upgrades: PathBuf,
    /// Home directory of the invoking user.
    pub home: PathBuf,
    /// Working copy of the installation repository.
    pub checkout_dir: PathBuf,
    /// Virtual environment provisioned for the default install type.
    pub venv_dir: PathBuf,
    /// Private half of the SSH key pair the playbooks use.
    pub ssh_private_key: PathBuf,
}

impl HostPaths {
    /// Standard system locations plus the per-user locations under `home`.
    pub fn for_home(home: &Path) -> Self {
        HostPaths {
            os_release: PathBuf::from("/etc/os-release"),
            sudoers_dir: PathBuf::from("/etc/sudoers.d"),
            auto_upgrades: PathBuf::from("/etc/apt/apt.conf.d/20auto-upgrades"),
            home: home.to_path_buf(),
            checkout_dir: home.join(CHECKOUT_DIR_NAME),
            venv_dir: home.join(VENV_DIR_NAME),
            ssh_private_key: home.join(".ssh").join("id_rsa"),
        }
    }

    /// The same layout rooted entirely under `root`, system files included.
    #[cfg(test)]
    pub fn under(root: &Path) -> Self {
        let home = root.join("home/fts");
        HostPaths {
            os_release: root.join("etc/os-release"),
            sudoers_dir: root.join("etc/sudoers.d"),
            auto_upgrades: root.join("etc/apt/apt.conf.d/20auto-upgrades"),
            ..HostPaths::for_home(&home)
        }
    }

    /// Python interpreter inside the virtual environment.
    pub fn venv_python(&self) -> PathBuf {
        self.venv_dir.join("bin").join("python")
    }
}

/// Operating system facts read from `os-release`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOs {
    /// `ID`, e.g. `ubuntu`.
    pub id: String,
    /// `PRETTY_NAME`, e.g. `Ubuntu 22.04.4 LTS`.
    pub pretty_name: String,
    /// `VERSION_ID`, e.g. `22.04`.
    pub version_id: String,
    /// Ubuntu codename the playbooks and PPAs are keyed on.
    pub codename: String,
}

impl HostOs {
    pub fn is_ubuntu(&self) -> bool {
        self.id == "ubuntu"
    }
}
