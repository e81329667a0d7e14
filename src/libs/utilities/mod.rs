// Small helpers shared by the preparation steps.

// Describing and running external programs.
pub mod command_runner;
// Duration and wall-clock formatting for the run banner.
pub mod timestamps;
