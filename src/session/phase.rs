// Session phase - Lifecycle state machine
// Idle -> Countdown -> Running -> {Completed | Stopped} -> Idle

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle phase of a session. `Running` is entered only after beat map
/// validation succeeded; `Stopped` only via the stop signal; `Completed`
/// only via full beat map consumption. Both terminal phases hold until an
/// explicit new-session reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionPhase {
    Idle = 0,
    Countdown = 1,
    Running = 2,
    Completed = 3,
    Stopped = 4,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Stopped)
    }

    /// Legal transitions of the lifecycle machine.
    pub fn can_transition_to(self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        matches!(
            (self, next),
            (Idle, Countdown)
                | (Countdown, Running)
                | (Countdown, Stopped)
                | (Running, Completed)
                | (Running, Stopped)
                | (Completed, Idle)
                | (Stopped, Idle)
        )
    }
}

impl From<u8> for SessionPhase {
    fn from(value: u8) -> Self {
        match value {
            1 => SessionPhase::Countdown,
            2 => SessionPhase::Running,
            3 => SessionPhase::Completed,
            4 => SessionPhase::Stopped,
            _ => SessionPhase::Idle,
        }
    }
}

/// Atomic wrapper sharing the phase between the engine and observers.
#[derive(Debug, Clone)]
pub struct AtomicSessionPhase {
    inner: Arc<AtomicU8>,
}

impl AtomicSessionPhase {
    pub fn new(phase: SessionPhase) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(phase as u8)),
        }
    }

    pub fn get(&self) -> SessionPhase {
        SessionPhase::from(self.inner.load(Ordering::Relaxed))
    }

    /// Compare-and-swap transition. Fails if the current phase is not
    /// `from` or the edge is not part of the lifecycle machine.
    pub fn try_transition(&self, from: SessionPhase, to: SessionPhase) -> bool {
        if !from.can_transition_to(to) {
            return false;
        }
        self.inner
            .compare_exchange(from as u8, to as u8, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }
}

impl Default for AtomicSessionPhase {
    fn default() -> Self {
        Self::new(SessionPhase::Idle)
    }
}
