// Input sources - Lazy per-session event streams and the pump thread
//
// The engine is agnostic to how edges are captured (polling or interrupts);
// a source only has to answer "is there an event by now". The pump moves
// events from the source into the bounded queue on its own thread so the
// scorer never blocks on hardware.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use ringbuf::traits::Producer;

use super::channels::InputProducer;
use super::event::InputEvent;
use crate::safety::StopSignal;
use crate::session::SharedSessionState;

/// A lazy, restartable-per-session sequence of input edge events.
pub trait InputSource: Send {
    /// Next event whose timestamp has passed, if any. `now` is the current
    /// session time in seconds.
    fn poll_event(&mut self, now: f64) -> Option<InputEvent>;
}

/// Source that releases a pre-planned, time-sorted list of events as the
/// session clock passes them. Drives tests and the demo's simulated player.
pub struct ScriptedInputSource {
    pending: VecDeque<InputEvent>,
}

impl ScriptedInputSource {
    /// `events` must be sorted by timestamp; they are released in order.
    pub fn new(mut events: Vec<InputEvent>) -> Self {
        events.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self {
            pending: events.into(),
        }
    }
}

impl InputSource for ScriptedInputSource {
    fn poll_event(&mut self, now: f64) -> Option<InputEvent> {
        if self.pending.front()?.timestamp <= now {
            self.pending.pop_front()
        } else {
            None
        }
    }
}

/// Pump loop: polls the source and pushes into the bounded queue. When the
/// queue is full the event is dropped with a warning; input responsiveness
/// of the hardware wins over completeness of the score stream.
pub struct InputPump<S: InputSource> {
    source: S,
    producer: InputProducer,
    state: Arc<SharedSessionState>,
    stop: StopSignal,
    poll: Duration,
    /// Raised once the pump will push no further events; the scorer keys
    /// its final drain on this.
    done: Arc<AtomicBool>,
}

impl<S: InputSource> InputPump<S> {
    pub fn new(
        source: S,
        producer: InputProducer,
        state: Arc<SharedSessionState>,
        stop: StopSignal,
        poll: Duration,
    ) -> Self {
        Self {
            source,
            producer,
            state,
            stop,
            poll,
            done: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn done_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.done)
    }

    pub fn run(mut self) {
        loop {
            if self.stop.is_engaged() {
                break;
            }
            if !self.state.is_running() {
                // session just ended: flush events whose timestamps already
                // passed so the scorer still sees last-window hits
                self.forward_pending();
                break;
            }

            self.forward_pending();
            thread::sleep(self.poll);
        }

        self.done.store(true, Ordering::Release);
    }

    fn forward_pending(&mut self) {
        let now = self.state.elapsed_seconds();
        while let Some(event) = self.source.poll_event(now) {
            if self.producer.try_push(event).is_err() {
                tracing::warn!(lane = %event.lane, t = event.timestamp, "input queue full, event dropped");
            }
        }
    }
}
