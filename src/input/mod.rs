// Input module - Switch events and the bounded queue feeding the scorer

pub mod channels;
pub mod event;
pub mod source;

pub use channels::{InputConsumer, InputProducer, create_input_channel};
pub use event::InputEvent;
pub use source::{InputPump, InputSource, ScriptedInputSource};
