// Command-line surface of the installer.

// The clap-derived flag struct and its conversion into a partial configuration.
pub mod cmd_enums;
// Strongly-typed values the flags and environment select between.
pub mod type_enums;
