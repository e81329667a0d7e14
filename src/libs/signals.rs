// SIGINT/SIGTERM handling.
//
// The handlers only flip an atomic flag. Blocking steps notice it once the
// child they are waiting on has exited and return `BootstrapError::Interrupted`,
// which unwinds the run and lets the cleanup guard restore the parked file.

use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};

use crate::libs::errors::BootstrapError;
use crate::log_debug;

static PROCESS_INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_termination_signal(_signal: nix::libc::c_int) {
    PROCESS_INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Shared view of "has the run been interrupted".
#[derive(Debug, Clone, Copy)]
pub struct InterruptFlag {
    flag: &'static AtomicBool,
}

impl InterruptFlag {
    /// The flag the process-wide signal handlers set.
    pub fn process() -> Self {
        InterruptFlag {
            flag: &PROCESS_INTERRUPTED,
        }
    }

    /// A flag no signal handler touches.
    #[cfg(test)]
    pub fn detached() -> Self {
        InterruptFlag {
            flag: Box::leak(Box::new(AtomicBool::new(false))),
        }
    }

    #[cfg(test)]
    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Interrupted)` once the flag is raised.
    pub fn check(&self) -> Result<(), BootstrapError> {
        if self.is_raised() {
            Err(BootstrapError::Interrupted)
        } else {
            Ok(())
        }
    }
}

/// Installs the SIGINT and SIGTERM handlers and returns the flag they set.
///
/// A failure to install a handler only costs interrupt-time cleanup, so it is
/// logged rather than treated as fatal.
pub fn install_handlers() -> InterruptFlag {
    let action = SigAction::new(
        SigHandler::Handler(on_termination_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for signal in [Signal::SIGINT, Signal::SIGTERM] {
        // SAFETY: the handler only performs an atomic store, which is async-signal-safe.
        if let Err(e) = unsafe { sigaction(signal, &action) } {
            log_debug!("Could not install {} handler: {}", signal, e);
        }
    }
    InterruptFlag::process()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::cleanup::{CleanupGuard, parked_path};

    #[test]
    fn detached_flags_are_independent() {
        let a = InterruptFlag::detached();
        let b = InterruptFlag::detached();
        a.raise();
        assert!(a.is_raised());
        assert!(!b.is_raised());
        assert!(matches!(a.check(), Err(BootstrapError::Interrupted)));
        assert!(b.check().is_ok());
    }

    /// Stops at the first interrupted check, like a run between two steps.
    fn step_after_signal(original: &std::path::Path) -> Result<(), BootstrapError> {
        let mut guard = CleanupGuard::new();
        guard.relocate(original)?;
        nix::sys::signal::raise(Signal::SIGINT).unwrap();
        InterruptFlag::process().check()?;
        guard.restore();
        Ok(())
    }

    #[test]
    fn delivered_sigint_unwinds_and_restores_the_parked_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let original = dir.path().join("20auto-upgrades");
        std::fs::write(&original, "APT::Periodic::Unattended-Upgrade \"1\";\n").unwrap();
        let flag = install_handlers();

        let err = step_after_signal(&original).unwrap_err();

        assert!(flag.is_raised());
        assert!(matches!(err, BootstrapError::Interrupted));
        assert_eq!(err.exit_code(), 130);
        assert!(original.exists());
        assert!(!parked_path(&original).exists());
    }

    #[test]
    fn copies_share_state() {
        let flag = InterruptFlag::detached();
        let copy = flag;
        copy.raise();
        assert!(flag.is_raised());
    }
}
