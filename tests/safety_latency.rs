//! Safety contract tests: once the emergency stop fires, every component
//! loop observes the signal within its poll interval and the actuators end
//! up cleared. The engine's documented bound is the longest poll interval;
//! the assertions here use a generous scheduler-tolerant margin.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use beatsync::hardware::RecordingActuator;
use beatsync::input::ScriptedInputSource;
use beatsync::safety::SharedTrigger;
use beatsync::{Engine, EngineConfig, SessionPhase, Termination, TimingTables, build_beat_map};

/// Beats scheduled far in the future, so only the stop path can end the
/// session quickly.
fn distant_tables() -> TimingTables {
    let mut tables = TimingTables::default();
    for i in 0..8 {
        let beat = 30.0 + i as f64;
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
fn test_emergency_stop_terminates_session_within_bound() {
    let beatmap = build_beat_map(&distant_tables(), Some(1)).unwrap();
    let config = EngineConfig {
        countdown_secs: 0.0,
        lane_seed: Some(1),
        ..EngineConfig::default()
    };
    let engine = Engine::new(beatmap, config);

    let north_east = RecordingActuator::new();
    let south_west = RecordingActuator::new();
    let ne_cleared = north_east.cleared_handle();
    let sw_cleared = south_west.cleared_handle();

    let (estop, trigger) = SharedTrigger::new();
    let fired_at = {
        let trigger = trigger.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            trigger.trigger();
            Instant::now()
        })
    };

    let report = engine
        .run(
            north_east,
            south_west,
            ScriptedInputSource::new(Vec::new()),
            estop,
        )
        .unwrap();
    let finished = Instant::now();
    let fired_at = fired_at.join().unwrap();

    assert_eq!(report.termination, Termination::Stopped);
    assert_eq!(engine.phase(), SessionPhase::Stopped);

    // all actuators cleared by their own drivers
    assert!(ne_cleared.load(Ordering::Relaxed));
    assert!(sw_cleared.load(Ordering::Relaxed));

    // contractual bound is the longest poll interval (1 ms here); allow a
    // wide margin for thread scheduling and the joins themselves
    let shutdown = finished.duration_since(fired_at);
    assert!(
        shutdown < Duration::from_millis(100),
        "shutdown took {shutdown:?}"
    );

    // no beat ever fired; every one is finalized as a miss
    assert_eq!(report.score.misses, 8);
    assert_eq!(report.score.points, 0);
    assert!(!engine.beatmap().events()[0].activated());
}

#[test]
fn test_repeat_triggers_are_no_ops() {
    let beatmap = build_beat_map(&distant_tables(), Some(2)).unwrap();
    let config = EngineConfig {
        countdown_secs: 0.0,
        lane_seed: Some(2),
        ..EngineConfig::default()
    };
    let engine = Engine::new(beatmap, config);

    let (estop, trigger) = SharedTrigger::new();
    trigger.trigger();

    let report = engine
        .run(
            RecordingActuator::new(),
            RecordingActuator::new(),
            ScriptedInputSource::new(Vec::new()),
            estop,
        )
        .unwrap();
    assert_eq!(report.termination, Termination::Stopped);

    // the signal stays engaged after the session; a second trigger before
    // the new-session reset changes nothing
    let stop = engine.stop_signal();
    assert!(stop.is_engaged());
    trigger.trigger();
    assert!(stop.is_engaged());
    assert_eq!(engine.phase(), SessionPhase::Stopped);
}

#[test]
fn test_orchestrator_can_engage_stop_directly() {
    // the stop signal is not exclusive to the e-stop hardware: the
    // orchestration layer may engage it (e.g. a UI abort button)
    let beatmap = build_beat_map(&distant_tables(), Some(3)).unwrap();
    let config = EngineConfig {
        countdown_secs: 0.0,
        lane_seed: Some(3),
        ..EngineConfig::default()
    };
    let engine = Engine::new(beatmap, config);
    let stop = engine.stop_signal();

    let killer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        stop.engage();
    });

    let (estop, _trigger) = SharedTrigger::new();
    let report = engine
        .run(
            RecordingActuator::new(),
            RecordingActuator::new(),
            ScriptedInputSource::new(Vec::new()),
            estop,
        )
        .unwrap();
    killer.join().unwrap();

    assert_eq!(report.termination, Termination::Stopped);
}
