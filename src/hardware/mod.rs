// Hardware module - Narrow contracts for the physical collaborators
// Actuator strips and the audio backend live behind traits; the engine
// core never talks to a device driver directly.

pub mod actuator;
pub mod audio;

pub use actuator::{
    ActuatorDriver, Color, ConsoleActuator, CuePattern, CueRecord, HardwareError,
    RecordingActuator,
};
pub use audio::{AudioDriver, NullAudioDriver};
