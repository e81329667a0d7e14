// Renders the resolved configuration as a table before any host change is made,
// so a verbose or dry run shows exactly what the playbooks will receive.

use prettytable::format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR;
use prettytable::{Table, row};

use crate::libs::orchestrator::playbook_for;
use crate::schemas::host::HostPaths;
use crate::schemas::install_config::InstallConfig;

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Builds the summary table for `config`.
pub fn summary_table(config: &InstallConfig, paths: &HostPaths) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(row![b => "Setting", "Value"]);

    table.add_row(row!["Install type", config.install_type]);
    table.add_row(row!["FreeTAKServer version", config.fts_version]);
    table.add_row(row!["Python version", config.python_version]);
    table.add_row(row!["Configuration path", config.config_relative_path]);
    table.add_row(row!["Repository", config.repo_url]);
    table.add_row(row!["Branch", config.branch]);
    table.add_row(row!["Checkout", paths.checkout_dir.display()]);
    if config.install_type.is_default() {
        table.add_row(row!["Virtual environment", paths.venv_dir.display()]);
    }
    table.add_row(row![
        "IP address",
        config.ip_override.as_deref().unwrap_or("(detected by playbook)")
    ]);
    table.add_row(row!["Playbook", playbook_for(config)]);
    table.add_row(row!["Check mode", yes_no(config.check_mode)]);
    table.add_row(row!["Dry run", yes_no(config.dry_run)]);
    table.add_row(row!["Dev test", yes_no(config.dev_test)]);
    table
}

/// Prints the summary table to stdout.
pub fn print_summary(config: &InstallConfig, paths: &HostPaths) {
    println!();
    summary_table(config, paths).printstd();
    println!();
}
