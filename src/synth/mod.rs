// Purpose: one playable cymbal voice and the messages that drive it
// This layer maps musical parameters onto the dsp primitives

pub mod message;
pub mod params;
pub mod voice;

pub use message::{MessageReceiver, VoiceMessage};
pub use params::{CymbalParams, ParamError};
pub use voice::CymbalVoice;
