// Building blocks of a bootstrap run.
// One module per preparation step, plus the shared plumbing they rely on.

// Shared plumbing.
pub mod cleanup;
pub mod config_loading;
pub mod errors;
pub mod latest_version;
pub mod paths;
pub mod signals;
pub mod summary;
pub mod utilities;

// Preparation steps, in the order a run performs them.
pub mod privileges;
pub mod os_detection;
pub mod system_packages;
pub mod python_env;
pub mod repository;
pub mod sudoers;
pub mod ssh_keys;
pub mod orchestrator;
