// Engine configuration
//
// Poll intervals bound both cue-timing jitter and shutdown latency: every
// component loop rechecks the stop signal once per iteration, so the
// worst-case shutdown latency is the longest configured interval. The
// engine's safety contract caps that at 5 ms; defaults sit at 1 ms.

use std::time::Duration;

/// Contractual ceiling for any poll interval, in milliseconds.
pub const MAX_POLL_MS: u64 = 5;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Session clock republish interval (ms).
    pub clock_poll_ms: u64,
    /// Cue driver re-check interval (ms). Bounds cue jitter.
    pub cue_poll_ms: u64,
    /// Input pump poll interval (ms).
    pub input_poll_ms: u64,
    /// Hit scorer queue drain interval (ms).
    pub scorer_poll_ms: u64,
    /// Safety controller e-stop poll interval (ms).
    pub safety_poll_ms: u64,
    /// Bounded input queue capacity; overflow drops events.
    pub input_queue_capacity: usize,
    /// How long the on-beat cue holds before its lane is cleared (s).
    pub on_beat_hold_secs: f64,
    /// Pause between Countdown entry and Running (s).
    pub countdown_secs: f64,
    /// Optional lane-assignment seed for reproducible sessions.
    pub lane_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clock_poll_ms: 1,
            cue_poll_ms: 1,
            input_poll_ms: 1,
            scorer_poll_ms: 1,
            safety_poll_ms: 1,
            input_queue_capacity: 256,
            on_beat_hold_secs: 0.5,
            countdown_secs: 3.0,
            lane_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn clock_poll(&self) -> Duration {
        Duration::from_millis(self.clock_poll_ms)
    }

    pub fn cue_poll(&self) -> Duration {
        Duration::from_millis(self.cue_poll_ms)
    }

    pub fn input_poll(&self) -> Duration {
        Duration::from_millis(self.input_poll_ms)
    }

    pub fn scorer_poll(&self) -> Duration {
        Duration::from_millis(self.scorer_poll_ms)
    }

    pub fn safety_poll(&self) -> Duration {
        Duration::from_millis(self.safety_poll_ms)
    }

    /// Worst-case shutdown latency under this configuration: the longest
    /// poll interval of any component loop.
    pub fn shutdown_latency_bound(&self) -> Duration {
        let longest = [
            self.clock_poll_ms,
            self.cue_poll_ms,
            self.input_poll_ms,
            self.scorer_poll_ms,
            self.safety_poll_ms,
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        Duration::from_millis(longest)
    }

    /// Whether every poll interval honors the safety contract.
    pub fn within_latency_contract(&self) -> bool {
        self.shutdown_latency_bound() <= Duration::from_millis(MAX_POLL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_honor_latency_contract() {
        let config = EngineConfig::default();
        assert!(config.within_latency_contract());
        assert_eq!(config.shutdown_latency_bound(), Duration::from_millis(1));
    }

    #[test]
    fn test_oversized_poll_breaks_contract() {
        let config = EngineConfig {
            cue_poll_ms: 20,
            ..EngineConfig::default()
        };
        assert!(!config.within_latency_contract());
        assert_eq!(config.shutdown_latency_bound(), Duration::from_millis(20));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = EngineConfig {
            lane_seed: Some(99),
            ..EngineConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lane_seed, Some(99));
        assert_eq!(back.input_queue_capacity, 256);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let back: EngineConfig = serde_json::from_str(r#"{"countdown_secs": 0.0}"#).unwrap();
        assert_eq!(back.countdown_secs, 0.0);
        assert_eq!(back.clock_poll_ms, 1);
    }
}
