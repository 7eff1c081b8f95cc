// Session engine - Spawns and joins the component threads
//
// One thread per component: session clock, two cue drivers (one per
// actuator group), input pump, hit scorer, safety controller. They share
// only the read-mostly structures (beat map, session state, score, stop
// signal) plus one bounded input queue; no component calls another.

use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};

use crate::beatmap::{BeatMap, BeatMapError, ConfigError, Lane, TimingSourcePaths, build_beat_map};
use crate::config::EngineConfig;
use crate::cue::CueDriver;
use crate::hardware::ActuatorDriver;
use crate::input::{InputPump, InputSource, create_input_channel};
use crate::safety::{EmergencyStopSource, SafetyController, StopSignal};
use crate::score::{HitScorer, ScoreSnapshot, ScoreState};

use super::clock::{SessionClock, SharedSessionState};
use super::phase::{AtomicSessionPhase, SessionPhase};

/// Lanes owned by the first actuator group (the north/right strip).
pub const NORTH_EAST_LANES: [Lane; 2] = [Lane::North, Lane::East];
/// Lanes owned by the second actuator group (the south/left strip).
pub const SOUTH_WEST_LANES: [Lane; 2] = [Lane::South, Lane::West];

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Termination {
    /// Every beat was consumed.
    Completed,
    /// The emergency stop fired.
    Stopped,
}

/// Final outcome handed back to the orchestration layer. Exit codes are the
/// caller's business, not the engine's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionReport {
    pub termination: Termination,
    pub score: ScoreSnapshot,
    pub beats_total: u32,
    pub finished_at: DateTime<Utc>,
}

/// Construction-time failure. Prevents `Running` from ever being entered.
#[derive(Debug, thiserror::Error)]
pub enum SessionInitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Map(#[from] BeatMapError),
}

/// Misuse of the session lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("session cannot start from phase {0:?}")]
    InvalidStart(SessionPhase),

    #[error("session cannot reset from phase {0:?}")]
    InvalidReset(SessionPhase),
}

pub struct Engine {
    beatmap: Arc<BeatMap>,
    config: EngineConfig,
    state: Arc<SharedSessionState>,
    score: Arc<ScoreState>,
    stop: StopSignal,
    phase: AtomicSessionPhase,
}

impl Engine {
    /// Engine over an already-validated beat map.
    pub fn new(beatmap: BeatMap, config: EngineConfig) -> Self {
        if !config.within_latency_contract() {
            tracing::warn!(
                bound_ms = config.shutdown_latency_bound().as_millis() as u64,
                "poll intervals exceed the shutdown latency contract"
            );
        }
        Self {
            beatmap: Arc::new(beatmap),
            config,
            state: SharedSessionState::new(),
            score: ScoreState::new(),
            stop: StopSignal::new(),
            phase: AtomicSessionPhase::default(),
        }
    }

    /// Load the six timing sources and build the map. Any source or
    /// validation failure aborts before a session can start.
    pub fn from_sources(
        paths: &TimingSourcePaths,
        config: EngineConfig,
    ) -> Result<Self, SessionInitError> {
        let tables = paths.load()?;
        let beatmap = build_beat_map(&tables, config.lane_seed)?;
        tracing::info!(beats = beatmap.len(), "beat map built");
        Ok(Self::new(beatmap, config))
    }

    pub fn beatmap(&self) -> Arc<BeatMap> {
        Arc::clone(&self.beatmap)
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase.get()
    }

    /// Handle for external observers and orchestration-layer stop requests.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn session_state(&self) -> Arc<SharedSessionState> {
        Arc::clone(&self.state)
    }

    pub fn score_snapshot(&self) -> ScoreSnapshot {
        self.score.snapshot()
    }

    /// Run one full session: Countdown, Running, then Completed or Stopped.
    /// Blocks until every component thread has exited.
    pub fn run<NE, SW, I, E>(
        &self,
        north_east: NE,
        south_west: SW,
        input: I,
        estop: E,
    ) -> Result<SessionReport, EngineError>
    where
        NE: ActuatorDriver + 'static,
        SW: ActuatorDriver + 'static,
        I: InputSource + 'static,
        E: EmergencyStopSource + 'static,
    {
        let from = self.phase.get();
        if !self.phase.try_transition(from, SessionPhase::Countdown) {
            return Err(EngineError::InvalidStart(from));
        }

        let mut estop = estop;
        if !self.countdown(&mut estop) {
            self.phase
                .try_transition(SessionPhase::Countdown, SessionPhase::Stopped);
            tracing::warn!("session stopped during countdown");
            return Ok(self.report(Termination::Stopped));
        }

        self.phase
            .try_transition(SessionPhase::Countdown, SessionPhase::Running);
        tracing::info!(
            beats = self.beatmap.len(),
            latency_bound_ms = self.config.shutdown_latency_bound().as_millis() as u64,
            "session running"
        );

        // running goes true before any component thread starts so none of
        // them mistakes startup for session end
        self.state.set_running(true);

        let (producer, consumer) = create_input_channel(self.config.input_queue_capacity);

        let clock = {
            let clock = SessionClock::new(
                Arc::clone(&self.state),
                Arc::clone(&self.beatmap),
                self.stop.clone(),
                self.config.clock_poll(),
            );
            thread::spawn(move || clock.run())
        };

        let driver_ne = {
            let driver = CueDriver::new(
                NORTH_EAST_LANES.to_vec(),
                north_east,
                Arc::clone(&self.beatmap),
                Arc::clone(&self.state),
                self.stop.clone(),
                self.config.cue_poll(),
                self.config.on_beat_hold_secs,
            );
            thread::spawn(move || driver.run())
        };

        let driver_sw = {
            let driver = CueDriver::new(
                SOUTH_WEST_LANES.to_vec(),
                south_west,
                Arc::clone(&self.beatmap),
                Arc::clone(&self.state),
                self.stop.clone(),
                self.config.cue_poll(),
                self.config.on_beat_hold_secs,
            );
            thread::spawn(move || driver.run())
        };

        let pump = InputPump::new(
            input,
            producer,
            Arc::clone(&self.state),
            self.stop.clone(),
            self.config.input_poll(),
        );
        let input_done = pump.done_handle();
        let pump = thread::spawn(move || pump.run());

        let scorer = {
            let scorer = HitScorer::new(
                Arc::clone(&self.beatmap),
                consumer,
                Arc::clone(&self.score),
                Arc::clone(&self.state),
                self.stop.clone(),
                self.config.scorer_poll(),
                input_done,
            );
            thread::spawn(move || scorer.run())
        };

        let safety = {
            let controller = SafetyController::new(
                estop,
                self.stop.clone(),
                Arc::clone(&self.state),
                self.config.safety_poll(),
            );
            thread::spawn(move || controller.run())
        };

        for (name, handle) in [
            ("clock", clock),
            ("cue-north-east", driver_ne),
            ("cue-south-west", driver_sw),
            ("input-pump", pump),
            ("scorer", scorer),
            ("safety", safety),
        ] {
            if handle.join().is_err() {
                tracing::error!(component = name, "component thread panicked");
            }
        }

        let termination = if self.stop.is_engaged() {
            Termination::Stopped
        } else {
            Termination::Completed
        };
        let to = match termination {
            Termination::Completed => SessionPhase::Completed,
            Termination::Stopped => SessionPhase::Stopped,
        };
        self.phase.try_transition(SessionPhase::Running, to);

        let report = self.report(termination);
        tracing::info!(?termination, score = ?report.score, "session finished");
        Ok(report)
    }

    /// Explicit new-session operation. Legal only from a terminal phase;
    /// rearms the stop signal, zeroes the score, and installs a fresh map.
    pub fn reset(&mut self, beatmap: BeatMap) -> Result<(), EngineError> {
        let from = self.phase.get();
        if !self.phase.try_transition(from, SessionPhase::Idle) {
            return Err(EngineError::InvalidReset(from));
        }
        self.stop.reset();
        self.score.reset();
        self.state.reset();
        self.beatmap = Arc::new(beatmap);
        Ok(())
    }

    /// Pre-session pause. Polls the e-stop source while waiting; returns
    /// false if the stop fired before the session could start.
    fn countdown(&self, estop: &mut impl EmergencyStopSource) -> bool {
        let slices = (self.config.countdown_secs * 1000.0) as u64;
        tracing::info!(secs = self.config.countdown_secs, "countdown started");
        for _ in 0..slices {
            if estop.triggered() || self.stop.is_engaged() {
                self.stop.engage();
                return false;
            }
            thread::sleep(std::time::Duration::from_millis(1));
        }
        !self.stop.is_engaged()
    }

    fn report(&self, termination: Termination) -> SessionReport {
        SessionReport {
            termination,
            score: self.score.snapshot(),
            beats_total: self.beatmap.len() as u32,
            finished_at: Utc::now(),
        }
    }
}
