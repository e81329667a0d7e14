// Defines the data structures used throughout the installer.

// The install configuration record and its resolution from flags and defaults.
pub mod install_config;
// Invoking user, filesystem layout and OS facts of the host.
pub mod host;
// PyPI JSON API response types.
pub mod pypi;
