// Audio contract - Track playback for the session orchestrator
// The engine core never touches audio; the binary starts the track when the
// session enters Running and stops it on teardown.

use super::HardwareError;
use std::path::Path;

pub trait AudioDriver: Send {
    /// Prepare a track for playback.
    fn load(&mut self, track: &Path) -> Result<(), HardwareError>;

    /// Start the loaded track.
    fn play(&mut self) -> Result<(), HardwareError>;

    /// Stop playback.
    fn stop(&mut self) -> Result<(), HardwareError>;
}

/// No-op audio backend for sessions without sound hardware.
#[derive(Default)]
pub struct NullAudioDriver {
    loaded: bool,
}

impl NullAudioDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioDriver for NullAudioDriver {
    fn load(&mut self, track: &Path) -> Result<(), HardwareError> {
        tracing::info!(track = %track.display(), "audio track loaded (null backend)");
        self.loaded = true;
        Ok(())
    }

    fn play(&mut self) -> Result<(), HardwareError> {
        if !self.loaded {
            return Err(HardwareError::Unavailable("no track loaded".to_string()));
        }
        tracing::info!("audio playback started (null backend)");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HardwareError> {
        tracing::info!("audio playback stopped (null backend)");
        Ok(())
    }
}
