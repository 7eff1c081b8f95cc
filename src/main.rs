use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use beatsync::hardware::{AudioDriver, ConsoleActuator, NullAudioDriver};
use beatsync::input::ScriptedInputSource;
use beatsync::safety::SharedTrigger;
use beatsync::{BeatMap, Engine, EngineConfig, InputEvent, TimingSourcePaths};

#[derive(Parser, Debug)]
#[command(author, version, about = "Beat timing and cue synchronization engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a full session with console actuators and a simulated player.
    Run {
        /// Directory holding the six timing source files.
        timing_dir: PathBuf,
        /// Seed for lane assignment and the simulated player.
        #[arg(short, long)]
        seed: Option<u64>,
        /// Audio track handed to the (null) audio backend.
        #[arg(short, long)]
        track: Option<PathBuf>,
        /// Countdown length in seconds.
        #[arg(long, default_value_t = 3.0)]
        countdown: f64,
    },
    /// Load and validate the timing sources without starting a session.
    Validate {
        /// Directory holding the six timing source files.
        timing_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            timing_dir,
            seed,
            track,
            countdown,
        } => run_session(&timing_dir, seed, track.as_deref(), countdown),
        Commands::Validate { timing_dir } => validate_sources(&timing_dir),
    }
}

fn run_session(
    timing_dir: &std::path::Path,
    seed: Option<u64>,
    track: Option<&std::path::Path>,
    countdown: f64,
) -> ExitCode {
    let config = EngineConfig {
        countdown_secs: countdown,
        lane_seed: seed,
        ..EngineConfig::default()
    };

    let paths = TimingSourcePaths::in_dir(timing_dir);
    let engine = match Engine::from_sources(&paths, config) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("session initialization failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut audio = NullAudioDriver::new();
    if let Some(track) = track {
        if let Err(e) = audio.load(track) {
            tracing::error!("audio load failed: {e}");
            return ExitCode::FAILURE;
        }
    }

    for beat in engine.beatmap().events() {
        tracing::debug!(
            beat = beat.beat_number,
            lane = %beat.lane,
            t = beat.beat_time,
            lead_up = beat.lead_up_start,
            "scheduled"
        );
    }

    let player = simulated_player(&engine.beatmap(), seed.unwrap_or(0));
    let (estop, _estop_handle) = SharedTrigger::new();

    if track.is_some() {
        if let Err(e) = audio.play() {
            tracing::warn!("audio playback failed: {e}");
        }
    }

    let report = match engine.run(
        ConsoleActuator::new("north-east"),
        ConsoleActuator::new("south-west"),
        player,
        estop,
    ) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("session refused to start: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = audio.stop() {
        tracing::warn!("audio stop failed: {e}");
    }

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("report serialization failed: {e}"),
    }
    ExitCode::SUCCESS
}

fn validate_sources(timing_dir: &std::path::Path) -> ExitCode {
    let paths = TimingSourcePaths::in_dir(timing_dir);
    match Engine::from_sources(&paths, EngineConfig::default()) {
        Ok(engine) => {
            tracing::info!(beats = engine.beatmap().len(), "timing sources valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("validation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Scripted stand-in for a human player: hits most beats with a little
/// timing jitter, misses some, and throws in the occasional stray tap.
fn simulated_player(beatmap: &BeatMap, seed: u64) -> ScriptedInputSource {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut events = Vec::new();

    for beat in beatmap.events() {
        match rng.gen_range(0..10) {
            // dropped beat
            0 => {}
            // sloppy hit somewhere in the active window
            1 | 2 => {
                let t = rng.gen_range(beat.atw_start..=beat.atw_end);
                events.push(InputEvent::new(beat.lane, t));
            }
            // precise hit
            _ => {
                let t = rng.gen_range(beat.ptw_start..=beat.ptw_end);
                events.push(InputEvent::new(beat.lane, t));
            }
        }

        // occasional stray on a random lane between beats
        if rng.gen_range(0..8) == 0 {
            let lane = beatsync::Lane::ALL[rng.gen_range(0..4)];
            events.push(InputEvent::new(lane, beat.atw_end + 0.05));
        }
    }

    ScriptedInputSource::new(events)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
