// Beat events - One scheduled beat with its timing windows and cue flags
//
// The map is built once before the session and shared read-only afterwards,
// except for three per-beat flags. Each flag has exactly one writer: the cue
// driver owning the beat's lane sets `lead_up_activated` and `activated`,
// the hit scorer sets `scored`. Flags are write-once false -> true.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// One of the four actuator/input channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Lane {
    North,
    East,
    South,
    West,
}

impl Lane {
    pub const ALL: [Lane; 4] = [Lane::North, Lane::East, Lane::South, Lane::West];

    /// Stable index, matching the pad numbering of the physical rig
    /// (0 = north, 1 = east/right, 2 = south, 3 = west/left).
    pub fn index(self) -> usize {
        match self {
            Lane::North => 0,
            Lane::East => 1,
            Lane::South => 2,
            Lane::West => 3,
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lane::North => "north",
            Lane::East => "east",
            Lane::South => "south",
            Lane::West => "west",
        };
        write!(f, "{name}")
    }
}

/// One scheduled beat.
///
/// Window instants are seconds from session start and satisfy
/// `lead_up_start <= atw_start <= ptw_start <= beat_time <= ptw_end <= atw_end`
/// (validated by the builder).
#[derive(Debug)]
pub struct BeatEvent {
    /// 1-based sequence position.
    pub beat_number: u32,
    pub lane: Lane,
    pub lead_up_start: f64,
    pub atw_start: f64,
    pub ptw_start: f64,
    pub beat_time: f64,
    pub ptw_end: f64,
    pub atw_end: f64,

    lead_up_activated: AtomicBool,
    activated: AtomicBool,
    scored: AtomicBool,
}

impl BeatEvent {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        beat_number: u32,
        lane: Lane,
        lead_up_start: f64,
        atw_start: f64,
        ptw_start: f64,
        beat_time: f64,
        ptw_end: f64,
        atw_end: f64,
    ) -> Self {
        Self {
            beat_number,
            lane,
            lead_up_start,
            atw_start,
            ptw_start,
            beat_time,
            ptw_end,
            atw_end,
            lead_up_activated: AtomicBool::new(false),
            activated: AtomicBool::new(false),
            scored: AtomicBool::new(false),
        }
    }

    pub fn lead_up_activated(&self) -> bool {
        self.lead_up_activated.load(Ordering::Relaxed)
    }

    pub fn activated(&self) -> bool {
        self.activated.load(Ordering::Relaxed)
    }

    pub fn scored(&self) -> bool {
        self.scored.load(Ordering::Relaxed)
    }

    /// Set the lead-up flag. Returns true if this call performed the
    /// false -> true transition. Caller must be the lane's cue driver.
    pub fn mark_lead_up_activated(&self) -> bool {
        !self.lead_up_activated.swap(true, Ordering::Relaxed)
    }

    /// Set the on-beat flag. Returns true if this call performed the
    /// transition. Caller must be the lane's cue driver.
    pub fn mark_activated(&self) -> bool {
        !self.activated.swap(true, Ordering::Relaxed)
    }

    /// Set the scored flag. Returns true if this call performed the
    /// transition. Caller must be the hit scorer.
    pub fn mark_scored(&self) -> bool {
        !self.scored.swap(true, Ordering::Relaxed)
    }

    /// Whether `t` falls inside the precise time window (closed interval).
    pub fn in_precise_window(&self, t: f64) -> bool {
        (self.ptw_start..=self.ptw_end).contains(&t)
    }

    /// Whether `t` falls inside the active time window (closed interval).
    pub fn in_active_window(&self, t: f64) -> bool {
        (self.atw_start..=self.atw_end).contains(&t)
    }
}

/// Ordered, validated sequence of beat events for one session.
#[derive(Debug)]
pub struct BeatMap {
    events: Vec<BeatEvent>,
}

impl BeatMap {
    pub(crate) fn new(events: Vec<BeatEvent>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[BeatEvent] {
        &self.events
    }

    pub fn get(&self, index: usize) -> Option<&BeatEvent> {
        self.events.get(index)
    }

    /// True once every beat's on-beat cue has fired. The session clock uses
    /// this as the completion condition.
    pub fn all_activated(&self) -> bool {
        self.events.iter().all(BeatEvent::activated)
    }

    /// Indices of the beats owned by a driver's lane set, in map order.
    /// Disjoint lane sets yield disjoint partitions, so two drivers never
    /// touch the same event.
    pub fn lane_indices(&self, lanes: &[Lane]) -> Vec<usize> {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, event)| lanes.contains(&event.lane))
            .map(|(index, _)| index)
            .collect()
    }

    /// Number of beats not yet claimed by an input event.
    pub fn unscored_count(&self) -> usize {
        self.events.iter().filter(|event| !event.scored()).count()
    }
}
