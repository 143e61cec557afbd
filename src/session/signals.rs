//! Shutdown signals
//!
//! SIGTERM, SIGINT and SIGHUP only raise a flag. The handlers are installed
//! without `SA_RESTART`, so a signal that lands while the event loop sits in
//! poll(2) ends the wait with EINTR and the loop reads the flag right away.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use log::debug;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Signals that end the event loop
const SHUTDOWN_SIGNALS: [Signal; 3] = [Signal::SIGTERM, Signal::SIGINT, Signal::SIGHUP];

/// Raised by the handler; a handler can only touch async-signal-safe state
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_shutdown_signal(_signo: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::Relaxed);
}

/// Whether a shutdown signal has arrived since startup
pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::Relaxed)
}

/// Install the shutdown handlers (call once, before entering the loop)
pub fn setup_signal_handlers() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_shutdown_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );
    for signal in SHUTDOWN_SIGNALS {
        // Safety: the handler only stores to an atomic
        unsafe { sigaction(signal, &action) }
            .with_context(|| format!("Failed to install {} handler", signal))?;
    }
    debug!("Shutdown handlers installed for {:?}", SHUTDOWN_SIGNALS);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::{pthread_sigmask, raise, SigmaskHow};

    #[test]
    fn test_signal_raises_flag_without_restart() {
        setup_signal_handlers().unwrap();
        // Make sure the test thread can receive SIGHUP
        let mut set = SigSet::empty();
        set.add(Signal::SIGHUP);
        pthread_sigmask(SigmaskHow::SIG_UNBLOCK, Some(&set), None).unwrap();

        raise(Signal::SIGHUP).unwrap();
        assert!(shutdown_requested());

        // Reinstalling returns the action that was in place
        let action = SigAction::new(
            SigHandler::Handler(on_shutdown_signal),
            SaFlags::empty(),
            SigSet::empty(),
        );
        let current = unsafe { sigaction(Signal::SIGHUP, &action) }.unwrap();
        assert!(!current.flags().contains(SaFlags::SA_RESTART));
    }
}
