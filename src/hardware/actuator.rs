// Actuator contract - Lane-level cue output on a physical light group
//
// The engine drives two actuator groups (one per cue driver). Everything
// below the lane level - pixel layout, animation frames, wire protocol -
// belongs to the driver implementation, not to this crate.

use crate::beatmap::Lane;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// RGB color sent with a cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Lead-up warning color (yellow).
    pub const LEAD_UP: Color = Color { r: 255, g: 255, b: 0 };
    /// On-beat color (green).
    pub const ON_BEAT: Color = Color { r: 0, g: 255, b: 0 };
    /// All pixels dark.
    pub const OFF: Color = Color { r: 0, g: 0, b: 0 };
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Shape of a cue on one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CuePattern {
    /// Warning animation ahead of a beat.
    LeadUp,
    /// Sharp, short on-beat flash.
    OnBeat,
    /// Lane dark.
    Clear,
}

/// Actuator failure. Logged by the cue driver; never fatal to the session.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    #[error("actuator write failed: {0}")]
    Write(String),

    #[error("actuator render failed: {0}")]
    Render(String),

    #[error("actuator unavailable: {0}")]
    Unavailable(String),
}

/// Handle to one physical actuator group.
///
/// `render()` latency is assumed bounded; a slow device eats into the
/// owning cue driver's poll interval.
pub trait ActuatorDriver: Send {
    /// Stage a pattern/color for one lane.
    fn set_lane_state(
        &mut self,
        lane: Lane,
        pattern: CuePattern,
        color: Color,
    ) -> Result<(), HardwareError>;

    /// Push staged lane states out to the device.
    fn render(&mut self) -> Result<(), HardwareError>;

    /// Darken every lane this group owns.
    fn clear_all(&mut self) -> Result<(), HardwareError>;
}

/// Actuator that logs cues instead of driving pixels. Used by the demo
/// binary when no hardware is attached.
pub struct ConsoleActuator {
    name: &'static str,
}

impl ConsoleActuator {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl ActuatorDriver for ConsoleActuator {
    fn set_lane_state(
        &mut self,
        lane: Lane,
        pattern: CuePattern,
        color: Color,
    ) -> Result<(), HardwareError> {
        tracing::info!(group = self.name, %lane, ?pattern, %color, "cue");
        Ok(())
    }

    fn render(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }

    fn clear_all(&mut self) -> Result<(), HardwareError> {
        tracing::info!(group = self.name, "actuator cleared");
        Ok(())
    }
}

/// One recorded `set_lane_state` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CueRecord {
    pub lane: Lane,
    pub pattern: CuePattern,
    pub color: Color,
}

/// Actuator that records every call for later inspection. The handles stay
/// valid after the actuator itself has been moved into a driver thread.
pub struct RecordingActuator {
    log: Arc<Mutex<Vec<CueRecord>>>,
    cleared: Arc<AtomicBool>,
    fail_writes: bool,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            cleared: Arc::new(AtomicBool::new(false)),
            fail_writes: false,
        }
    }

    /// Recording actuator whose lane writes always fail, for exercising the
    /// hardware-error policy.
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    /// Shared view of the recorded cue log.
    pub fn log_handle(&self) -> Arc<Mutex<Vec<CueRecord>>> {
        Arc::clone(&self.log)
    }

    /// Shared view of the cleared flag, set by `clear_all`.
    pub fn cleared_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cleared)
    }
}

impl Default for RecordingActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorDriver for RecordingActuator {
    fn set_lane_state(
        &mut self,
        lane: Lane,
        pattern: CuePattern,
        color: Color,
    ) -> Result<(), HardwareError> {
        if self.fail_writes {
            return Err(HardwareError::Write(format!("injected failure on {lane}")));
        }
        self.log
            .lock()
            .expect("cue log poisoned")
            .push(CueRecord { lane, pattern, color });
        self.cleared.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn render(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }

    fn clear_all(&mut self) -> Result<(), HardwareError> {
        self.cleared.store(true, Ordering::Relaxed);
        Ok(())
    }
}
