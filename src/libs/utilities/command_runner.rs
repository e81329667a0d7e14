//! # External Command Execution
//!
//! Every step of the bootstrap run is "build a command line, run it, stop on a
//! non-zero exit". Steps describe what to run as an [`ExternalCommand`] and hand
//! it to a [`CommandRunner`]; [`SystemRunner`] is the implementation that
//! actually spawns processes. Tests substitute a runner that records the
//! commands instead.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use colored::Colorize;

use crate::libs::errors::BootstrapError;
use crate::libs::signals::InterruptFlag;
use crate::{log_debug, log_info};

/// A fully described invocation of an external tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment variables for the child, on top of the inherited environment.
    pub envs: Vec<(String, String)>,
    pub current_dir: Option<PathBuf>,
    /// Run through `sudo -u <user> -H` instead of as root.
    pub run_as: Option<String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        ExternalCommand {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            current_dir: None,
            run_as: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Runs the command as `user` unless `user` is root.
    pub fn run_as(mut self, user: &str) -> Self {
        if user != "root" {
            self.run_as = Some(user.to_string());
        }
        self
    }

    /// Whether an argument equal to `needle` is present.
    #[cfg(test)]
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }

    /// Builds the `std::process::Command` this description stands for.
    fn to_command(&self) -> Command {
        let mut command = match &self.run_as {
            Some(user) => {
                let mut sudo = Command::new("sudo");
                sudo.args(["-u", user.as_str(), "-H", "--"]).arg(&self.program);
                sudo
            }
            None => Command::new(&self.program),
        };
        command.args(&self.args);
        for (key, value) in &self.envs {
            command.env(key, value);
        }
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(user) = &self.run_as {
            write!(f, "sudo -u {user} -H -- ")?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Executes external commands on behalf of the bootstrap steps.
pub trait CommandRunner {
    /// Runs `command` to completion.
    ///
    /// # Errors
    /// * [`BootstrapError::Spawn`] if the program could not be started.
    /// * [`BootstrapError::Interrupted`] if SIGINT/SIGTERM arrived while it ran.
    /// * [`BootstrapError::ExternalTool`] if it exited unsuccessfully.
    fn run(&self, command: &ExternalCommand) -> Result<(), BootstrapError>;
}

/// Spawns real processes with inherited stdio, so apt, git and Ansible
/// output streams straight to the terminal.
pub struct SystemRunner {
    interrupt: InterruptFlag,
}

impl SystemRunner {
    pub fn new(interrupt: InterruptFlag) -> Self {
        SystemRunner { interrupt }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ExternalCommand) -> Result<(), BootstrapError> {
        log_info!("Executing: {}", command.to_string().cyan());
        if !command.envs.is_empty() {
            log_debug!("  with environment: {:?}", command.envs);
        }

        let status = command
            .to_command()
            .status()
            .map_err(|source| BootstrapError::Spawn {
                command: command.to_string(),
                source,
            })?;

        // The terminal delivers SIGINT to the child as well; once it has
        // exited, unwind instead of starting the next step.
        self.interrupt.check()?;

        if status.success() {
            log_debug!("`{}` finished successfully", command.program);
            Ok(())
        } else {
            Err(BootstrapError::ExternalTool {
                command: command.to_string(),
                code: status.code(),
            })
        }
    }
}


/// A [`CommandRunner`] double that records commands instead of running them.
#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::path::Path;

    use super::{CommandRunner, ExternalCommand};
    use crate::libs::errors::BootstrapError;
    use crate::libs::signals::InterruptFlag;

    #[derive(Default)]
    pub struct RecordingRunner {
        commands: RefCell<Vec<ExternalCommand>>,
        failures: Vec<(String, i32)>,
        interrupt_on: Option<(String, InterruptFlag)>,
    }

    fn base_name(program: &str) -> &str {
        Path::new(program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(program)
    }

    impl RecordingRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every invocation of `program` exit with `code`.
        pub fn failing_on(mut self, program: &str, code: i32) -> Self {
            self.failures.push((program.to_string(), code));
            self
        }

        /// Simulates SIGINT arriving while `program` runs.
        pub fn interrupting_on(mut self, program: &str, flag: InterruptFlag) -> Self {
            self.interrupt_on = Some((program.to_string(), flag));
            self
        }

        pub fn commands(&self) -> Vec<ExternalCommand> {
            self.commands.borrow().clone()
        }

        /// Base names of the programs run, in order.
        pub fn programs(&self) -> Vec<String> {
            self.commands
                .borrow()
                .iter()
                .map(|c| base_name(&c.program).to_string())
                .collect()
        }

        pub fn ran(&self, program: &str) -> bool {
            self.programs().iter().any(|p| p == program)
        }
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, command: &ExternalCommand) -> Result<(), BootstrapError> {
            self.commands.borrow_mut().push(command.clone());
            let name = base_name(&command.program);

            if let Some((program, flag)) = &self.interrupt_on {
                if program == name {
                    flag.raise();
                    return Err(BootstrapError::Interrupted);
                }
            }
            if let Some((_, code)) = self.failures.iter().find(|(program, _)| program == name) {
                return Err(BootstrapError::ExternalTool {
                    command: command.to_string(),
                    code: Some(*code),
                });
            }
            Ok(())
        }
    }
}
