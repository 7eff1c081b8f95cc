// Hit scorer - Matches input events against open beat windows
//
// Precise window first, then active window, first unscored match wins; a
// beat is scored by at most one input. Events matching nothing are strays.
// Windows are judged as they stand at event time; there is no retroactive
// matching against windows that had not opened yet.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use ringbuf::traits::Consumer;

use crate::beatmap::BeatMap;
use crate::input::{InputConsumer, InputEvent};
use crate::safety::StopSignal;
use crate::session::SharedSessionState;

use super::state::{Judgment, ScoreState};

/// Judge one input event against the beat map and record the outcome.
pub fn judge_event(beatmap: &BeatMap, score: &ScoreState, event: InputEvent) -> Judgment {
    // precise pass
    for beat in beatmap.events() {
        if beat.lane == event.lane
            && !beat.scored()
            && beat.in_precise_window(event.timestamp)
            && beat.mark_scored()
        {
            score.record_precise();
            return Judgment::Precise;
        }
    }

    // active pass
    for beat in beatmap.events() {
        if beat.lane == event.lane
            && !beat.scored()
            && beat.in_active_window(event.timestamp)
            && beat.mark_scored()
        {
            score.record_hit();
            return Judgment::Hit;
        }
    }

    tracing::debug!(lane = %event.lane, t = event.timestamp, "stray input");
    score.record_stray();
    Judgment::Stray
}

/// Scorer loop: drains the bounded input queue and keeps the score.
pub struct HitScorer {
    beatmap: Arc<BeatMap>,
    consumer: InputConsumer,
    score: Arc<ScoreState>,
    state: Arc<SharedSessionState>,
    stop: StopSignal,
    poll: Duration,
    /// Set by the input pump once no further events will arrive.
    input_done: Arc<AtomicBool>,
}

impl HitScorer {
    pub fn new(
        beatmap: Arc<BeatMap>,
        consumer: InputConsumer,
        score: Arc<ScoreState>,
        state: Arc<SharedSessionState>,
        stop: StopSignal,
        poll: Duration,
        input_done: Arc<AtomicBool>,
    ) -> Self {
        Self {
            beatmap,
            consumer,
            score,
            state,
            stop,
            poll,
            input_done,
        }
    }

    /// Run until the session ends, then finalize misses. Events still in
    /// flight when `running` flips false are judged before the final sweep
    /// (the pump raises `input_done` only after its last push); a stop
    /// signal exits without waiting to honor the shutdown latency bound.
    pub fn run(mut self) {
        loop {
            // observe the closed flag before draining: once it is up, the
            // drain below sees every event the pump ever pushed
            let closed = !self.state.is_running() && self.input_done.load(Ordering::Acquire);

            while let Some(event) = self.consumer.try_pop() {
                judge_event(&self.beatmap, &self.score, event);
            }

            if self.stop.is_engaged() || closed {
                break;
            }

            thread::sleep(self.poll);
        }

        self.finalize_misses();
    }

    /// One-time sweep after the session ends: every beat never claimed by an
    /// input becomes a miss.
    fn finalize_misses(&self) {
        let mut misses = 0u32;
        for beat in self.beatmap.events() {
            if !beat.scored() {
                self.score.record_miss();
                misses += 1;
            }
        }
        if misses > 0 {
            tracing::info!(misses, "finalized unscored beats as misses");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beatmap::{BeatEvent, Lane};

    /// The single reference beat of the scoring contract:
    /// lead-up 1.0, atw [1.5, 2.5], ptw [1.8, 2.2], beat at 2.0, lane North.
    fn one_beat_map() -> BeatMap {
        BeatMap::new(vec![BeatEvent::new(
            1,
            Lane::North,
            1.0,
            1.5,
            1.8,
            2.0,
            2.2,
            2.5,
        )])
    }

    #[test]
    fn test_precise_hit_scores_two_points() {
        let map = one_beat_map();
        let score = ScoreState::default();

        let judgment = judge_event(&map, &score, InputEvent::new(Lane::North, 1.9));
        assert_eq!(judgment, Judgment::Precise);
        assert!(map.get(0).unwrap().scored());
        assert_eq!(score.snapshot().points, 2);
    }

    #[test]
    fn test_second_input_on_scored_beat_is_stray() {
        let map = one_beat_map();
        let score = ScoreState::default();

        judge_event(&map, &score, InputEvent::new(Lane::North, 1.9));
        let judgment = judge_event(&map, &score, InputEvent::new(Lane::North, 2.1));
        assert_eq!(judgment, Judgment::Stray);

        let snapshot = score.snapshot();
        assert_eq!(snapshot.precise_hits, 1);
        assert_eq!(snapshot.strays, 1);
        assert_eq!(snapshot.points, 2);
    }

    #[test]
    fn test_wrong_lane_is_stray() {
        let map = one_beat_map();
        let score = ScoreState::default();

        let judgment = judge_event(&map, &score, InputEvent::new(Lane::South, 1.9));
        assert_eq!(judgment, Judgment::Stray);
        assert!(!map.get(0).unwrap().scored());
        assert_eq!(score.snapshot().points, 0);
    }

    #[test]
    fn test_active_window_scores_one_point() {
        let map = one_beat_map();
        let score = ScoreState::default();

        // inside atw, outside ptw
        let judgment = judge_event(&map, &score, InputEvent::new(Lane::North, 1.6));
        assert_eq!(judgment, Judgment::Hit);
        assert_eq!(score.snapshot().points, 1);
    }

    #[test]
    fn test_outside_all_windows_is_stray() {
        let map = one_beat_map();
        let score = ScoreState::default();

        let judgment = judge_event(&map, &score, InputEvent::new(Lane::North, 0.5));
        assert_eq!(judgment, Judgment::Stray);
        assert!(!map.get(0).unwrap().scored());
    }

    #[test]
    fn test_precise_window_outranks_active_window_of_earlier_beat() {
        // input at 1.9 sits in beat 1's atw tail and beat 2's ptw; the
        // precise pass runs first, so beat 2 takes it
        let map = BeatMap::new(vec![
            BeatEvent::new(1, Lane::North, 0.2, 0.5, 0.8, 1.0, 1.2, 2.0),
            BeatEvent::new(2, Lane::North, 1.0, 1.5, 1.8, 2.0, 2.2, 2.5),
        ]);
        let score = ScoreState::default();

        let judgment = judge_event(&map, &score, InputEvent::new(Lane::North, 1.9));
        assert_eq!(judgment, Judgment::Precise);
        assert!(!map.get(0).unwrap().scored());
        assert!(map.get(1).unwrap().scored());
    }

    #[test]
    fn test_earlier_unscored_beat_matches_first_within_a_pass() {
        // both beats' active windows contain 1.9; first match wins
        let map = BeatMap::new(vec![
            BeatEvent::new(1, Lane::North, 0.2, 0.5, 0.8, 1.0, 1.2, 2.0),
            BeatEvent::new(2, Lane::North, 1.0, 1.5, 2.3, 2.4, 2.45, 2.5),
        ]);
        let score = ScoreState::default();

        let judgment = judge_event(&map, &score, InputEvent::new(Lane::North, 1.9));
        assert_eq!(judgment, Judgment::Hit);
        assert!(map.get(0).unwrap().scored());
        assert!(!map.get(1).unwrap().scored());
    }

    #[test]
    fn test_finalized_misses_count_unscored_beats() {
        let map = Arc::new(one_beat_map());
        let score = ScoreState::new();
        let state = SharedSessionState::new();
        let stop = StopSignal::new();
        let (_tx, rx) = crate::input::create_input_channel(4);

        // session already over, queue empty: scorer should sweep immediately
        state.set_running(false);
        let scorer = HitScorer::new(
            Arc::clone(&map),
            rx,
            Arc::clone(&score),
            state,
            stop,
            Duration::from_millis(1),
            Arc::new(AtomicBool::new(true)),
        );
        scorer.run();

        let snapshot = score.snapshot();
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.points, 0);
    }
}
