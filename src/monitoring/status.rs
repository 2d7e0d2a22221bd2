//! Exit status and cached liveness

/// How a process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    /// Exit code; `128 + signal` when killed by a signal
    pub code: i32,
    /// Signal if killed
    pub signal: Option<i32>,
}

impl ExitStatus {
    /// Normal exit with `code`
    pub fn exited(code: i32) -> Self {
        Self { code, signal: None }
    }

    /// Termination by `signal`
    pub fn signaled(signal: i32) -> Self {
        Self {
            code: 128 + signal,
            signal: Some(signal),
        }
    }

    pub fn success(&self) -> bool {
        self.code == 0 && self.signal.is_none()
    }
}

/// Cached process liveness
///
/// Only ever moves from `Running` to `Exited`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Running,
    Exited(ExitStatus),
}

impl Liveness {
    pub fn is_running(&self) -> bool {
        matches!(self, Liveness::Running)
    }

    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            Liveness::Running => None,
            Liveness::Exited(status) => Some(*status),
        }
    }

    /// Record a probe result, keeping the first exit observed
    pub fn observe(&mut self, probe: Option<ExitStatus>) -> Liveness {
        if let (Liveness::Running, Some(status)) = (*self, probe) {
            *self = Liveness::Exited(status);
        }
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signaled_uses_shell_convention() {
        let status = ExitStatus::signaled(15);
        assert_eq!(status.code, 143);
        assert_eq!(status.signal, Some(15));
        assert!(!status.success());
    }

    #[test]
    fn exited_zero_is_success() {
        assert!(ExitStatus::exited(0).success());
        assert!(!ExitStatus::exited(7).success());
    }

    #[test]
    fn liveness_is_monotonic() {
        let mut live = Liveness::Running;
        assert_eq!(live.observe(None), Liveness::Running);

        let first = live.observe(Some(ExitStatus::exited(7)));
        assert_eq!(first.exit_status(), Some(ExitStatus::exited(7)));

        // A later, different probe result does not overwrite the cache.
        let again = live.observe(Some(ExitStatus::exited(1)));
        assert_eq!(again.exit_status(), Some(ExitStatus::exited(7)));
        assert!(!live.observe(None).is_running());
    }
}
