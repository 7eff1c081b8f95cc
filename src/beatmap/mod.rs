// Beat map module - Scheduled beats, lane assignment, and timing sources

pub mod builder;
pub mod event;
pub mod source;

pub use builder::{BeatMapError, TimingTables, build_beat_map};
pub use event::{BeatEvent, BeatMap, Lane};
pub use source::{ConfigError, TimingSourcePaths, read_timing_file};
