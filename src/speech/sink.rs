//! Audio output abstraction
//!
//! The controller only needs start/pause/resume/stop. Whatever actually plays
//! the audio reports a natural end back through
//! `SpeechController::playback_ended` with the ticket it was given.

use crate::speech::controller::SpeechTicket;

/// Synthesized speech, as returned by the synthesis service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Something that can play one clip at a time
pub trait AudioSink {
    /// Start playing `clip` from the beginning
    fn play(&mut self, ticket: SpeechTicket, clip: AudioClip);
    fn pause(&mut self);
    fn resume(&mut self);
    /// Stop playback and rewind
    fn stop(&mut self);
}

/// Sink commands, as seen by a `RecordingSink`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCommand {
    Play { ticket: SpeechTicket, bytes: usize },
    Pause,
    Resume,
    Stop,
}

/// Sink that plays nothing and remembers what it was told
///
/// Used headless and in tests to check that at most one stream is ever live.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub commands: Vec<SinkCommand>,
    live: Option<SpeechTicket>,
    max_live: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket of the clip currently loaded, paused or not
    pub fn live(&self) -> Option<SpeechTicket> {
        self.live
    }

    /// Most streams that were ever live at once
    pub fn max_live(&self) -> usize {
        self.max_live
    }

    /// Simulate the clip running out, returning the ticket to report
    pub fn finish(&mut self) -> Option<SpeechTicket> {
        self.live.take()
    }
}

impl AudioSink for RecordingSink {
    fn play(&mut self, ticket: SpeechTicket, clip: AudioClip) {
        let live = usize::from(self.live.is_some()) + 1;
        self.max_live = self.max_live.max(live);
        self.live = Some(ticket);
        self.commands.push(SinkCommand::Play {
            ticket,
            bytes: clip.len(),
        });
    }

    fn pause(&mut self) {
        self.commands.push(SinkCommand::Pause);
    }

    fn resume(&mut self) {
        self.commands.push(SinkCommand::Resume);
    }

    fn stop(&mut self) {
        self.live = None;
        self.commands.push(SinkCommand::Stop);
    }
}
