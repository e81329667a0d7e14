//! Error types for the bootstrap run.
//!
//! Every fatal condition surfaces as a [`BootstrapError`] and travels up to
//! `main`, which logs it and exits with [`BootstrapError::exit_code`]. Nothing
//! below the top level recovers from one of these.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit code used when the run was cut short by SIGINT/SIGTERM.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("this installer must be run with root privileges (try: sudo {program})")]
    Privilege { program: String },

    #[error("unsupported install type '{0}' (expected one of: latest, stable, legacy)")]
    UnsupportedInstallType(String),

    #[error("invalid IP address '{0}'")]
    InvalidIpAddress(String),

    #[error("unsupported operating system '{0}' (Debian or Ubuntu required, use --dev-test to override)")]
    UnsupportedOs(String),

    #[error("`{command}` exited with {}", describe_code(.code))]
    ExternalTool { command: String, code: Option<i32> },

    /// `ansible-playbook` failed. Its exit code becomes the process exit code.
    #[error("playbook run `{command}` failed with {}", describe_code(.code))]
    Playbook { command: String, code: Option<i32> },

    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration file {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("interrupted by signal")]
    Interrupted,
}

impl BootstrapError {
    /// Builds an [`BootstrapError::Io`] for a filesystem step.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        BootstrapError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this failure.
    ///
    /// Only the playbook run hands its own exit code through; a failing
    /// preparation step (apt, git, visudo, ...) exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::Interrupted => INTERRUPTED_EXIT_CODE,
            BootstrapError::Playbook {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
