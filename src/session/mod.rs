// Session module - Clock, phase machine, and engine orchestration

pub mod clock;
pub mod engine;
pub mod phase;

pub use clock::{AtomicF64, SessionClock, SharedSessionState};
pub use engine::{
    Engine, EngineError, NORTH_EAST_LANES, SOUTH_WEST_LANES, SessionInitError, SessionReport,
    Termination,
};
pub use phase::{AtomicSessionPhase, SessionPhase};
