// Application entry points.
// `fts-bootstrap` has a single action, so there is a single module.

// Drives a full bootstrap run, step by step.
pub mod install;
