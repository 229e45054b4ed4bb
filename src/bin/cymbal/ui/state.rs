//! Shared state types for UI communication
//!
//! Everything crossing from the audio thread is `Copy` so pushing it into
//! the ring buffer never allocates.

/// Snapshot sent by the audio callback after every block.
#[derive(Clone, Copy, Debug, Default)]
pub struct VoiceStatus {
    /// Whether the voice is still ringing
    pub active: bool,
    /// Frames rendered since the stream started
    pub frames: u64,
    /// Parameter updates the voice refused
    pub rejected: u32,
}

/// Parameter the arrow keys currently adjust.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Feedback,
    TimeMod,
    Decay,
    NotchMix,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Feedback => Focus::TimeMod,
            Focus::TimeMod => Focus::Decay,
            Focus::Decay => Focus::NotchMix,
            Focus::NotchMix => Focus::Feedback,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Focus::Feedback => "feedback",
            Focus::TimeMod => "time mod",
            Focus::Decay => "decay",
            Focus::NotchMix => "notch mix",
        }
    }
}
