// Beat map builder - Validation and lane assignment
//
// Takes the six index-aligned timing columns, checks every per-beat window
// ordering and the global beat-time monotonicity, then assigns each beat a
// lane such that no lane repeats within the last two beats.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::event::{BeatEvent, BeatMap, Lane};

/// Six equal-length, index-aligned sequences of seconds values, one row per
/// beat.
#[derive(Debug, Clone, Default)]
pub struct TimingTables {
    pub lead_up_start: Vec<f64>,
    pub atw_start: Vec<f64>,
    pub ptw_start: Vec<f64>,
    pub beat_time: Vec<f64>,
    pub ptw_end: Vec<f64>,
    pub atw_end: Vec<f64>,
}

impl TimingTables {
    fn columns(&self) -> [(&'static str, &[f64]); 6] {
        [
            ("lead_up_start", &self.lead_up_start),
            ("atw_start", &self.atw_start),
            ("ptw_start", &self.ptw_start),
            ("beat_time", &self.beat_time),
            ("ptw_end", &self.ptw_end),
            ("atw_end", &self.atw_end),
        ]
    }
}

/// Malformed beat map. Fatal to session initialization; `index` is the
/// 0-based offending beat.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BeatMapError {
    #[error("timing column {column} has {actual} entries, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("beat {index}: timing windows out of order")]
    WindowOrder { index: usize },

    #[error("beat {index}: negative time value")]
    NegativeTime { index: usize },

    #[error("beat {index}: beat time decreases from previous beat")]
    NonMonotonic { index: usize },
}

/// Build a validated, lane-assigned beat map with all flags initialized
/// false. Passing a seed makes the lane sequence reproducible.
pub fn build_beat_map(tables: &TimingTables, seed: Option<u64>) -> Result<BeatMap, BeatMapError> {
    validate(tables)?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut previous: Option<Lane> = None;
    let mut before_previous: Option<Lane> = None;
    let mut events = Vec::with_capacity(tables.beat_time.len());

    for i in 0..tables.beat_time.len() {
        let lane = pick_lane(&mut rng, previous, before_previous);
        before_previous = previous;
        previous = Some(lane);

        events.push(BeatEvent::new(
            (i + 1) as u32,
            lane,
            tables.lead_up_start[i],
            tables.atw_start[i],
            tables.ptw_start[i],
            tables.beat_time[i],
            tables.ptw_end[i],
            tables.atw_end[i],
        ));
    }

    Ok(BeatMap::new(events))
}

/// Uniform choice among the lanes not used by the previous two beats.
fn pick_lane(rng: &mut StdRng, previous: Option<Lane>, before_previous: Option<Lane>) -> Lane {
    let candidates: Vec<Lane> = Lane::ALL
        .into_iter()
        .filter(|lane| Some(*lane) != previous && Some(*lane) != before_previous)
        .collect();
    candidates[rng.gen_range(0..candidates.len())]
}

fn validate(tables: &TimingTables) -> Result<(), BeatMapError> {
    let expected = tables.beat_time.len();
    for (column, values) in tables.columns() {
        if values.len() != expected {
            return Err(BeatMapError::LengthMismatch {
                column,
                expected,
                actual: values.len(),
            });
        }
    }

    for i in 0..expected {
        let ordered = [
            tables.lead_up_start[i],
            tables.atw_start[i],
            tables.ptw_start[i],
            tables.beat_time[i],
            tables.ptw_end[i],
            tables.atw_end[i],
        ];

        if ordered.iter().any(|value| *value < 0.0) {
            return Err(BeatMapError::NegativeTime { index: i });
        }
        if ordered.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(BeatMapError::WindowOrder { index: i });
        }
        if i > 0 && tables.beat_time[i] < tables.beat_time[i - 1] {
            return Err(BeatMapError::NonMonotonic { index: i });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Well-formed tables with one beat per second.
    fn tables(count: usize) -> TimingTables {
        let mut tables = TimingTables::default();
        for i in 0..count {
            let beat = (i + 2) as f64;
            tables.lead_up_start.push(beat - 1.0);
            tables.atw_start.push(beat - 0.5);
            tables.ptw_start.push(beat - 0.2);
            tables.beat_time.push(beat);
            tables.ptw_end.push(beat + 0.2);
            tables.atw_end.push(beat + 0.5);
        }
        tables
    }

    #[test]
    fn test_no_lane_repeats_within_two_beats() {
        for seed in 0..50 {
            let map = build_beat_map(&tables(200), Some(seed)).unwrap();
            let lanes: Vec<Lane> = map.events().iter().map(|event| event.lane).collect();
            for i in 1..lanes.len() {
                assert_ne!(lanes[i], lanes[i - 1], "seed {seed} repeats at {i}");
                if i >= 2 {
                    assert_ne!(lanes[i], lanes[i - 2], "seed {seed} repeats at {i} (gap 2)");
                }
            }
        }
    }

    #[test]
    fn test_length_five_seeded_obeys_anti_repetition() {
        let map = build_beat_map(&tables(5), Some(42)).unwrap();
        let lanes: Vec<Lane> = map.events().iter().map(|event| event.lane).collect();
        assert_eq!(lanes.len(), 5);
        for i in 1..5 {
            assert_ne!(lanes[i], lanes[i - 1]);
            if i >= 2 {
                assert_ne!(lanes[i], lanes[i - 2]);
            }
        }
    }

    #[test]
    fn test_same_seed_same_lanes() {
        let first = build_beat_map(&tables(64), Some(7)).unwrap();
        let second = build_beat_map(&tables(64), Some(7)).unwrap();
        for (a, b) in first.events().iter().zip(second.events()) {
            assert_eq!(a.lane, b.lane);
        }
    }

    #[test]
    fn test_beat_numbers_are_one_based() {
        let map = build_beat_map(&tables(3), Some(0)).unwrap();
        let numbers: Vec<u32> = map.events().iter().map(|event| event.beat_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut bad = tables(4);
        bad.ptw_end.pop();
        let err = build_beat_map(&bad, Some(0)).unwrap_err();
        assert_eq!(
            err,
            BeatMapError::LengthMismatch {
                column: "ptw_end",
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn test_window_order_violation_reports_index() {
        let mut bad = tables(4);
        // ptw must not open after the beat itself
        bad.ptw_start[2] = bad.beat_time[2] + 0.1;
        let err = build_beat_map(&bad, Some(0)).unwrap_err();
        assert_eq!(err, BeatMapError::WindowOrder { index: 2 });
    }

    #[test]
    fn test_decreasing_beat_time_rejected() {
        let mut bad = tables(4);
        let earlier = bad.beat_time[0];
        bad.lead_up_start[3] = earlier - 1.0;
        bad.atw_start[3] = earlier - 0.5;
        bad.ptw_start[3] = earlier - 0.2;
        bad.beat_time[3] = earlier;
        bad.ptw_end[3] = earlier + 0.2;
        bad.atw_end[3] = earlier + 0.5;
        let err = build_beat_map(&bad, Some(0)).unwrap_err();
        assert_eq!(err, BeatMapError::NonMonotonic { index: 3 });
    }

    #[test]
    fn test_negative_time_rejected() {
        let mut bad = tables(2);
        bad.lead_up_start[0] = -0.5;
        let err = build_beat_map(&bad, Some(0)).unwrap_err();
        assert_eq!(err, BeatMapError::NegativeTime { index: 0 });
    }

    #[test]
    fn test_empty_tables_build_empty_map() {
        let map = build_beat_map(&TimingTables::default(), Some(0)).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_flags_initialized_false() {
        let map = build_beat_map(&tables(8), Some(3)).unwrap();
        for event in map.events() {
            assert!(!event.lead_up_activated());
            assert!(!event.activated());
            assert!(!event.scored());
        }
    }
}
