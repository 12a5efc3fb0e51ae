//! Speech sessions
//!
//! The page signals speech through callbacks on the utterance or audio
//! element: start, end, and error. Error ends the session like a normal end.

use visage_core::SessionId;

/// Speech lifecycle signal from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Ended,
    Failed,
}

impl SpeechEvent {
    /// Speaking flag after this event
    pub fn speaking(self) -> bool {
        matches!(self, SpeechEvent::Started)
    }
}

/// What drives the mouth during a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    /// Oscillators, no audio
    Procedural,
    /// Live spectrum
    Analyser,
}

/// One lip-sync session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechSession {
    pub id: SessionId,
    pub source: SessionSource,
    /// Clock time the session started
    pub started_at: f32,
}

impl SpeechSession {
    pub fn duration(&self, now: f32) -> f32 {
        (now - self.started_at).max(0.0)
    }
}
