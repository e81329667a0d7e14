use std::ffi::OsString;
use std::net::IpAddr;

use clap::Parser;

use crate::cli::type_enums::InstallType;
use crate::schemas::install_config::PartialConfig;

/// Defines the command-line interface of `fts-bootstrap`.
/// `#[derive(Parser)]` generates the argument parsing code via `clap`.
///
/// Unknown flags and flags missing their value are rejected by clap before
/// anything on the host is touched.
#[derive(Parser, Debug)]
#[command(name = "fts-bootstrap", version)]
#[command(about = "Bootstrap a FreeTAKServer installation on Debian or Ubuntu")]
#[command(
    after_help = "Run as root, e.g. `sudo fts-bootstrap --core`. The real installation is done by the \
                  FreeTAKHub-Installation Ansible playbooks; this tool prepares the host and runs them."
)]
pub struct Cli {
    /// Print debug output and run the playbooks with extra Ansible verbosity.
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Run the playbooks in Ansible check mode.
    #[arg(short, long)]
    pub(crate) check: bool,

    /// Install the FreeTAKServer core only instead of all components.
    #[arg(long)]
    pub(crate) core: bool,

    /// Install the newest FreeTAKServer release from PyPI (default).
    #[arg(long, overrides_with_all = ["stable", "legacy"])]
    pub(crate) latest: bool,

    /// Install the pinned stable release.
    #[arg(short, long, overrides_with_all = ["latest", "legacy"])]
    pub(crate) stable: bool,

    /// Install the legacy 1.x release.
    #[arg(short, long, overrides_with_all = ["latest", "stable"])]
    pub(crate) legacy: bool,

    /// Check out this ref of the installation repository, ignoring --branch.
    #[arg(short = 'B', long = "override-branch", value_name = "BRANCH", hide = true)]
    pub(crate) override_branch: Option<String>,

    /// Clone the installation playbooks from this repository instead of the default one.
    #[arg(long, value_name = "URL")]
    pub(crate) repo: Option<String>,

    /// Branch of the installation repository to use.
    #[arg(long, value_name = "NAME")]
    pub(crate) branch: Option<String>,

    /// Development test mode: tolerate unsupported systems and force the web map install.
    #[arg(long)]
    pub(crate) dev_test: bool,

    /// Prepare the host but stop before running the playbooks.
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// IP address FreeTAKServer should advertise.
    #[arg(long, value_name = "ADDR")]
    pub(crate) ip_addr: Option<IpAddr>,

    /// Disable colored output.
    #[arg(long)]
    pub(crate) no_color: bool,
}

impl Cli {
    /// Parses an argument list, program name first.
    pub fn parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Cli::try_parse_from(args)
    }

    /// The install type selected by flags, if any.
    /// The `overrides_with_all` settings guarantee at most one of them is set.
    fn selected_install_type(&self) -> Option<InstallType> {
        if self.legacy {
            Some(InstallType::Legacy)
        } else if self.stable {
            Some(InstallType::Stable)
        } else if self.latest {
            Some(InstallType::Latest)
        } else {
            None
        }
    }

    /// Converts the parsed flags into the partial configuration that
    /// `validate_and_finalize` completes with environment and file defaults.
    pub fn into_partial(self) -> PartialConfig {
        PartialConfig {
            install_type: self.selected_install_type(),
            repo: self.repo,
            branch: self.branch,
            override_branch: self.override_branch,
            ip_addr: self.ip_addr.map(|addr| addr.to_string()),
            dry_run: self.dry_run,
            core_only: self.core,
            verbose: self.verbose,
            check_mode: self.check,
            dev_test: self.dev_test,
            no_color: self.no_color,
        }
    }
}

/// Exit code for a clap parse result that did not produce a `Cli`.
/// `--help` and `--version` are successes; every other parse error is a usage error.
pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { 1 } else { 0 }
}
