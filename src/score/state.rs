// Score state - Lock-free counters with a single writer (the hit scorer)

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Classification of one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgment {
    /// Inside the precise time window: +2 points.
    Precise,
    /// Inside the active time window only: +1 point.
    Hit,
    /// Matched no open window: no score change.
    Stray,
}

/// Running score for one session. The hit scorer is the only writer; the
/// UI layer may snapshot it at any time.
#[derive(Debug, Default)]
pub struct ScoreState {
    precise_hits: AtomicU32,
    hits: AtomicU32,
    misses: AtomicU32,
    strays: AtomicU32,
    points: AtomicU32,
}

/// Point-in-time copy of the score, reported at session end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScoreSnapshot {
    pub precise_hits: u32,
    pub hits: u32,
    pub misses: u32,
    pub strays: u32,
    pub points: u32,
}

impl ScoreState {
    pub const PRECISE_POINTS: u32 = 2;
    pub const HIT_POINTS: u32 = 1;

    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_precise(&self) {
        self.precise_hits.fetch_add(1, Ordering::Relaxed);
        self.points.fetch_add(Self::PRECISE_POINTS, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.points.fetch_add(Self::HIT_POINTS, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stray(&self) {
        self.strays.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            precise_hits: self.precise_hits.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            strays: self.strays.load(Ordering::Relaxed),
            points: self.points.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter. Only the new-session reset path calls this.
    pub(crate) fn reset(&self) {
        self.precise_hits.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.strays.store(0, Ordering::Relaxed);
        self.points.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_values() {
        let score = ScoreState::default();
        score.record_precise();
        score.record_hit();
        score.record_hit();
        score.record_miss();
        score.record_stray();

        let snapshot = score.snapshot();
        assert_eq!(snapshot.precise_hits, 1);
        assert_eq!(snapshot.hits, 2);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.strays, 1);
        assert_eq!(snapshot.points, 4);
    }

    #[test]
    fn test_reset_zeroes_counters() {
        let score = ScoreState::default();
        score.record_precise();
        score.record_stray();
        score.reset();

        let snapshot = score.snapshot();
        assert_eq!(snapshot.points, 0);
        assert_eq!(snapshot.precise_hits, 0);
        assert_eq!(snapshot.strays, 0);
    }
}
