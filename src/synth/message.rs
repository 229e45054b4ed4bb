#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use super::params::CymbalParams;

/// Control events sent from a UI or sequencer thread to the audio thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VoiceMessage {
    /// Strike with velocity in `[0, 1]`.
    NoteOn { velocity: f32 },
    NoteOff,
    /// Replace every parameter. Rejected params leave the voice unchanged.
    SetParams(CymbalParams),
    /// Silence immediately and clear all state.
    Panic,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<VoiceMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<VoiceMessage> {
    fn pop(&mut self) -> Option<VoiceMessage> {
        Consumer::pop(self).ok()
    }
}
