//! Kernel restart trigger.
//!
//! The rewired environment only takes effect in a fresh process, because the
//! interpreter read its environment once at start. The notebook service
//! supervises the kernel and restarts it after termination, so the trigger
//! simply kills the current process. Unconditional and deliberately blunt;
//! there is nothing to clean up in an ephemeral host.

/// Abstraction over the host's process-restart primitive.
pub trait RestartTrigger {
    /// Request that the current process be terminated and restarted by its
    /// supervisor.
    fn trigger(&self);
}

/// Restarts the kernel by sending `SIGKILL` to the current process.
///
/// `SIGKILL` rather than a catchable signal: the kernel must not get the
/// chance to flush state that references the pre-install environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigkillRestart;

impl RestartTrigger for SigkillRestart {
    fn trigger(&self) {
        // SAFETY: kill(getpid(), SIGKILL) has no memory-safety obligations;
        // it terminates this process and never returns control here.
        unsafe {
            libc::kill(libc::getpid(), libc::SIGKILL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingRestart;

    #[test]
    fn recording_trigger_counts_invocations() {
        let restart = RecordingRestart::default();
        assert_eq!(restart.triggered(), 0);
        restart.trigger();
        restart.trigger();
        assert_eq!(restart.triggered(), 2);
    }
}
