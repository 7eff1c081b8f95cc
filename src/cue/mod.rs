// Cue module - Per-actuator-group beat cue scheduling

pub mod driver;

pub use driver::CueDriver;
