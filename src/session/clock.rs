// Session clock - Single authority for elapsed session time
//
// The clock captures a monotonic start instant when the session enters
// Running, then republishes `elapsed = now - start` every tick. It is the
// only writer of the shared state; cue drivers and the hit scorer read it
// without ever blocking the clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::beatmap::BeatMap;
use crate::safety::StopSignal;

/// Thread-safe f64 using atomic bit storage. A single aligned word, so
/// readers never observe a torn update.
#[derive(Debug)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Elapsed time and running flag for one session. Single writer (the
/// session clock), many readers.
#[derive(Debug)]
pub struct SharedSessionState {
    elapsed: AtomicF64,
    running: AtomicBool,
}

impl SharedSessionState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            elapsed: AtomicF64::new(0.0),
            running: AtomicBool::new(false),
        })
    }

    /// Seconds since the session entered Running.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.get()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub(crate) fn set_elapsed(&self, seconds: f64) {
        self.elapsed.set(seconds);
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        self.set_elapsed(0.0);
        self.set_running(false);
    }
}

/// The clock loop. Owns the start instant; performs no lane or actuator
/// logic.
pub struct SessionClock {
    state: Arc<SharedSessionState>,
    beatmap: Arc<BeatMap>,
    stop: StopSignal,
    poll: Duration,
}

impl SessionClock {
    pub fn new(
        state: Arc<SharedSessionState>,
        beatmap: Arc<BeatMap>,
        stop: StopSignal,
        poll: Duration,
    ) -> Self {
        Self {
            state,
            beatmap,
            stop,
            poll,
        }
    }

    /// Run until every beat has fired or the stop signal engages. Flips
    /// `running` false on exit; that transition is what the other component
    /// loops key their own shutdown on.
    pub fn run(self) {
        let start = Instant::now();
        self.state.set_running(true);

        loop {
            self.state.set_elapsed(start.elapsed().as_secs_f64());

            if self.stop.is_engaged() {
                tracing::info!("session clock observed stop signal");
                break;
            }
            if self.beatmap.all_activated() {
                tracing::info!(
                    elapsed = self.state.elapsed_seconds(),
                    "all beats fired, session complete"
                );
                break;
            }

            thread::sleep(self.poll);
        }

        self.state.set_running(false);
    }
}
