// Safety module - Emergency-stop signal and bounded-latency shutdown
//
// One process-wide stop signal, engaged at most once per session. Every
// component loop polls it each iteration, so worst-case shutdown latency is
// bounded by the longest poll interval. The controller only signals; each
// cue driver clears its own actuator under its own access discipline.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::session::SharedSessionState;

/// Process-wide emergency-stop flag. Write-once per session; reset only by
/// the explicit new-session operation.
#[derive(Debug, Clone)]
pub struct StopSignal {
    inner: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Engage the stop. Returns true if this call engaged it; repeat
    /// triggers before the next session are no-ops.
    pub fn engage(&self) -> bool {
        !self.inner.swap(true, Ordering::Relaxed)
    }

    pub fn is_engaged(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }

    /// Clear the signal for a new session. Only the session reset path may
    /// call this.
    pub(crate) fn reset(&self) {
        self.inner.store(false, Ordering::Relaxed);
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscription point for the physical emergency-stop input. The source
/// debounces; this trait delivers the falling edge as a one-shot poll.
pub trait EmergencyStopSource: Send {
    /// True once the e-stop has fired. May keep returning true afterwards;
    /// the controller only acts on the first observation.
    fn triggered(&mut self) -> bool;
}

/// In-memory e-stop source. `TriggerHandle::trigger()` stands in for the
/// debounced hardware edge; used by tests and the demo binary.
pub struct SharedTrigger {
    fired: Arc<AtomicBool>,
}

/// Cloneable handle that fires a `SharedTrigger`.
#[derive(Debug, Clone)]
pub struct TriggerHandle {
    fired: Arc<AtomicBool>,
}

impl TriggerHandle {
    pub fn trigger(&self) {
        self.fired.store(true, Ordering::Relaxed);
    }
}

impl SharedTrigger {
    pub fn new() -> (Self, TriggerHandle) {
        let fired = Arc::new(AtomicBool::new(false));
        (
            Self {
                fired: Arc::clone(&fired),
            },
            TriggerHandle { fired },
        )
    }
}

impl EmergencyStopSource for SharedTrigger {
    fn triggered(&mut self) -> bool {
        self.fired.load(Ordering::Relaxed)
    }
}

/// Watches one emergency-stop source and fans the stop signal out to the
/// rest of the engine.
pub struct SafetyController<S: EmergencyStopSource> {
    source: S,
    stop: StopSignal,
    state: Arc<SharedSessionState>,
    poll: Duration,
}

impl<S: EmergencyStopSource> SafetyController<S> {
    pub fn new(
        source: S,
        stop: StopSignal,
        state: Arc<SharedSessionState>,
        poll: Duration,
    ) -> Self {
        Self {
            source,
            stop,
            state,
            poll,
        }
    }

    /// Poll until the source fires or the session ends. Engages the stop
    /// signal exactly once.
    pub fn run(mut self) {
        loop {
            if self.stop.is_engaged() {
                break;
            }
            if self.source.triggered() {
                if self.stop.engage() {
                    tracing::warn!("emergency stop triggered, signalling shutdown");
                }
                break;
            }
            if !self.state.is_running() {
                break;
            }
            thread::sleep(self.poll);
        }
    }
}
