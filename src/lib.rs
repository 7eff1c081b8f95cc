// beatsync - Beat timing and cue synchronization engine
//
// Drives timed visual cues on two actuator groups in sync with a
// pre-computed beat map and scores switch inputs against per-beat timing
// windows. One thread per component, coordinating only through shared
// read-mostly state, one bounded input queue, and a write-once stop signal.

pub mod beatmap;
pub mod config;
pub mod cue;
pub mod hardware;
pub mod input;
pub mod safety;
pub mod score;
pub mod session;

// Re-export commonly used types for convenience
pub use beatmap::{
    BeatEvent, BeatMap, BeatMapError, ConfigError, Lane, TimingSourcePaths, TimingTables,
    build_beat_map,
};
pub use config::EngineConfig;
pub use cue::CueDriver;
pub use hardware::{ActuatorDriver, AudioDriver, Color, CuePattern, HardwareError};
pub use input::{InputEvent, InputSource, create_input_channel};
pub use safety::{EmergencyStopSource, SharedTrigger, StopSignal, TriggerHandle};
pub use score::{Judgment, ScoreSnapshot, ScoreState};
pub use session::{
    Engine, EngineError, SessionClock, SessionInitError, SessionPhase, SessionReport,
    SharedSessionState, Termination,
};
