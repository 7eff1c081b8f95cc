// Cue driver - Walks one lane partition and fires lead-up/on-beat cues
//
// Each driver owns a disjoint lane set and a private cursor over the beats
// in those lanes, so two drivers never write the same beat event and need no
// coordination to advance. The poll interval bounds cue-timing jitter and,
// together with the per-iteration stop check, the shutdown latency.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::beatmap::{BeatMap, Lane};
use crate::hardware::{ActuatorDriver, Color, CuePattern};
use crate::safety::StopSignal;
use crate::session::SharedSessionState;

pub struct CueDriver<A: ActuatorDriver> {
    lanes: Vec<Lane>,
    actuator: A,
    beatmap: Arc<BeatMap>,
    /// Indices into the beat map owned by this driver's lanes.
    owned: Vec<usize>,
    cursor: usize,
    state: Arc<SharedSessionState>,
    stop: StopSignal,
    poll: Duration,
    /// How long the on-beat cue holds before the lane is cleared.
    on_beat_hold: f64,
    /// Lanes waiting to be cleared once their hold deadline passes.
    pending_clears: Vec<(Lane, f64)>,
}

impl<A: ActuatorDriver> CueDriver<A> {
    pub fn new(
        lanes: Vec<Lane>,
        actuator: A,
        beatmap: Arc<BeatMap>,
        state: Arc<SharedSessionState>,
        stop: StopSignal,
        poll: Duration,
        on_beat_hold: f64,
    ) -> Self {
        let owned = beatmap.lane_indices(&lanes);
        Self {
            lanes,
            actuator,
            beatmap,
            owned,
            cursor: 0,
            state,
            stop,
            poll,
            on_beat_hold,
            pending_clears: Vec::new(),
        }
    }

    /// Run until the owned beats are exhausted or the stop signal engages,
    /// then clear the actuator and exit.
    pub fn run(mut self) {
        loop {
            if self.stop.is_engaged() || !self.state.is_running() {
                break;
            }

            let now = self.state.elapsed_seconds();
            self.clear_expired_holds(now);

            if self.cursor >= self.owned.len() {
                if self.pending_clears.is_empty() {
                    break;
                }
            } else {
                self.fire_due_cues(now);
            }

            thread::sleep(self.poll);
        }

        if let Err(e) = self.actuator.clear_all() {
            tracing::warn!(lanes = ?self.lanes, "actuator clear failed: {e}");
        }
        tracing::debug!(lanes = ?self.lanes, fired = self.cursor, "cue driver exited");
    }

    /// Steps 1 and 2 of the per-iteration contract: lead-up cue once the
    /// lead-up window opens, on-beat cue once the beat time passes, then
    /// advance. A failed actuator write is logged and the beat still counts
    /// as fired; one bad cue must not end the session.
    fn fire_due_cues(&mut self, now: f64) {
        let beatmap = Arc::clone(&self.beatmap);
        let beat = &beatmap.events()[self.owned[self.cursor]];

        if now >= beat.lead_up_start && !beat.lead_up_activated() {
            if let Err(e) = self.issue(beat.lane, CuePattern::LeadUp, Color::LEAD_UP) {
                tracing::warn!(beat = beat.beat_number, lane = %beat.lane, "lead-up cue failed: {e}");
            }
            beat.mark_lead_up_activated();
        }

        if now >= beat.beat_time && !beat.activated() {
            if let Err(e) = self.issue(beat.lane, CuePattern::OnBeat, Color::ON_BEAT) {
                tracing::warn!(beat = beat.beat_number, lane = %beat.lane, "on-beat cue failed: {e}");
            }
            beat.mark_activated();
            self.pending_clears.push((beat.lane, now + self.on_beat_hold));
            self.cursor += 1;
        }
    }

    /// Darken lanes whose on-beat hold has elapsed. Non-blocking: holds are
    /// deadlines checked each iteration, never sleeps.
    fn clear_expired_holds(&mut self, now: f64) {
        let mut i = 0;
        while i < self.pending_clears.len() {
            let (lane, deadline) = self.pending_clears[i];
            if now >= deadline {
                if let Err(e) = self.issue(lane, CuePattern::Clear, Color::OFF) {
                    tracing::warn!(%lane, "lane clear failed: {e}");
                }
                self.pending_clears.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    fn issue(
        &mut self,
        lane: Lane,
        pattern: CuePattern,
        color: Color,
    ) -> Result<(), crate::hardware::HardwareError> {
        self.actuator.set_lane_state(lane, pattern, color)?;
        self.actuator.render()
    }
}
