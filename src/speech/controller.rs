//! Speech playback state machine
//!
//! `Idle -> Generating -> Playing <-> Paused -> Idle`, keyed by the text being
//! voiced. Every `start` hands out a fresh ticket; audio or end-of-playback
//! reports carrying an older ticket are ignored, so the last request wins.

use crate::core::error::{GameError, Result};
use crate::speech::sink::{AudioClip, AudioSink};
use serde::{Deserialize, Serialize};

/// Identifies one speech request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeechTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SpeechStatus {
    #[default]
    Idle,
    /// Waiting on the synthesis service
    Generating,
    Playing,
    Paused,
}

/// Snapshot of the controller for presenters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SpeechState {
    pub status: SpeechStatus,
    /// Present exactly when `status` is not `Idle`
    pub active_text: Option<String>,
}

/// Owns the audio sink and the single active speech request
#[derive(Debug)]
pub struct SpeechController<S> {
    sink: S,
    status: SpeechStatus,
    active_text: Option<String>,
    current: Option<SpeechTicket>,
    next_ticket: u64,
}

impl<S: AudioSink> SpeechController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            status: SpeechStatus::Idle,
            active_text: None,
            current: None,
            next_ticket: 0,
        }
    }

    pub fn status(&self) -> SpeechStatus {
        self.status
    }

    pub fn active_text(&self) -> Option<&str> {
        self.active_text.as_deref()
    }

    pub fn state(&self) -> SpeechState {
        SpeechState {
            status: self.status,
            active_text: self.active_text.clone(),
        }
    }

    /// Is `text` the one being voiced (or generated)?
    pub fn is_active(&self, text: &str) -> bool {
        self.active_text.as_deref() == Some(text)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Begin voicing `text`
    ///
    /// Anything already generating or playing is cancelled first. The caller
    /// fetches audio and reports it with `finish_generation` and this ticket.
    pub fn start(&mut self, text: impl Into<String>) -> SpeechTicket {
        if self.status != SpeechStatus::Idle {
            self.cancel();
        }

        let ticket = SpeechTicket(self.next_ticket);
        self.next_ticket += 1;
        self.current = Some(ticket);
        self.active_text = Some(text.into());
        self.status = SpeechStatus::Generating;
        tracing::debug!("Speech {:?} generating", ticket);
        ticket
    }

    /// Report the synthesis result for a request
    ///
    /// Results for superseded requests are dropped. A failed request returns
    /// the controller to `Idle` and hands the error back for display.
    pub fn finish_generation(
        &mut self,
        ticket: SpeechTicket,
        audio: Result<AudioClip>,
    ) -> Result<()> {
        if self.current != Some(ticket) || self.status != SpeechStatus::Generating {
            tracing::debug!("Dropping audio for superseded speech {:?}", ticket);
            return Ok(());
        }

        match audio {
            Ok(clip) => {
                tracing::debug!("Speech {:?} playing {} bytes", ticket, clip.len());
                self.sink.play(ticket, clip);
                self.status = SpeechStatus::Playing;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Speech generation failed: {}", e);
                self.reset();
                Err(e)
            }
        }
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.status != SpeechStatus::Playing {
            return Err(GameError::InvalidTransition(format!(
                "cannot pause speech while {:?}",
                self.status
            )));
        }
        self.sink.pause();
        self.status = SpeechStatus::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.status != SpeechStatus::Paused {
            return Err(GameError::InvalidTransition(format!(
                "cannot resume speech while {:?}",
                self.status
            )));
        }
        self.sink.resume();
        self.status = SpeechStatus::Playing;
        Ok(())
    }

    /// Stop and forget the active request, from any state
    pub fn cancel(&mut self) {
        if matches!(self.status, SpeechStatus::Playing | SpeechStatus::Paused) {
            self.sink.stop();
        }
        if self.status != SpeechStatus::Idle {
            tracing::debug!("Speech {:?} cancelled", self.current);
        }
        self.reset();
    }

    /// The sink ran out of audio for `ticket`
    pub fn playback_ended(&mut self, ticket: SpeechTicket) {
        let playing = matches!(self.status, SpeechStatus::Playing | SpeechStatus::Paused);
        if playing && self.current == Some(ticket) {
            tracing::debug!("Speech {:?} finished", ticket);
            self.reset();
        }
    }

    /// One-button control for `text`
    ///
    /// Starts `text` if it is not the active one, pauses or resumes it if it
    /// is, and ignores presses while its audio is still generating. Returns
    /// the ticket when a new request was started.
    pub fn toggle(&mut self, text: &str) -> Result<Option<SpeechTicket>> {
        if !self.is_active(text) {
            return Ok(Some(self.start(text)));
        }
        match self.status {
            SpeechStatus::Generating => Ok(None),
            SpeechStatus::Playing => self.pause().map(|_| None),
            SpeechStatus::Paused => self.resume().map(|_| None),
            SpeechStatus::Idle => Ok(Some(self.start(text))),
        }
    }

    fn reset(&mut self) {
        self.status = SpeechStatus::Idle;
        self.active_text = None;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::sink::{RecordingSink, SinkCommand};

    fn clip() -> AudioClip {
        AudioClip::new(vec![1, 2, 3], "audio/mpeg")
    }

    fn controller() -> SpeechController<RecordingSink> {
        SpeechController::new(RecordingSink::new())
    }

    #[test]
    fn test_start_then_play() {
        let mut speech = controller();
        let ticket = speech.start("The boss roars.");
        assert_eq!(speech.status(), SpeechStatus::Generating);
        assert_eq!(speech.active_text(), Some("The boss roars."));

        speech.finish_generation(ticket, Ok(clip())).unwrap();
        assert_eq!(speech.status(), SpeechStatus::Playing);
        assert_eq!(
            speech.sink().commands,
            vec![SinkCommand::Play { ticket, bytes: 3 }]
        );
    }

    #[test]
    fn test_failure_returns_to_idle() {
        let mut speech = controller();
        let ticket = speech.start("text");
        let result = speech.finish_generation(ticket, Err(GameError::SpeechError("503".into())));
        assert!(result.is_err());
        assert_eq!(speech.state(), SpeechState::default());
        assert!(speech.sink().commands.is_empty());
    }

    #[test]
    fn test_pause_resume_guards() {
        let mut speech = controller();
        assert!(speech.pause().is_err());
        assert!(speech.resume().is_err());

        let ticket = speech.start("text");
        assert!(speech.pause().is_err());
        speech.finish_generation(ticket, Ok(clip())).unwrap();

        speech.pause().unwrap();
        assert_eq!(speech.status(), SpeechStatus::Paused);
        assert!(speech.pause().is_err());
        speech.resume().unwrap();
        assert_eq!(speech.status(), SpeechStatus::Playing);
    }

    #[test]
    fn test_cancel_stops_and_clears() {
        let mut speech = controller();
        let ticket = speech.start("text");
        speech.finish_generation(ticket, Ok(clip())).unwrap();
        speech.cancel();
        assert_eq!(speech.status(), SpeechStatus::Idle);
        assert_eq!(speech.active_text(), None);
        assert_eq!(speech.sink().commands.last(), Some(&SinkCommand::Stop));
    }

    #[test]
    fn test_natural_end_without_stop() {
        let mut speech = controller();
        let ticket = speech.start("text");
        speech.finish_generation(ticket, Ok(clip())).unwrap();

        let ended = speech.sink_mut().finish().unwrap();
        speech.playback_ended(ended);
        assert_eq!(speech.state(), SpeechState::default());
        assert!(!speech.sink().commands.contains(&SinkCommand::Stop));
    }

    #[test]
    fn test_stale_end_is_ignored() {
        let mut speech = controller();
        let first = speech.start("a");
        speech.finish_generation(first, Ok(clip())).unwrap();
        let second = speech.start("b");
        speech.finish_generation(second, Ok(clip())).unwrap();

        speech.playback_ended(first);
        assert_eq!(speech.status(), SpeechStatus::Playing);
        assert_eq!(speech.active_text(), Some("b"));
    }

    #[test]
    fn test_toggle_cycle() {
        let mut speech = controller();
        let ticket = speech.toggle("text").unwrap().expect("should start");
        assert_eq!(speech.toggle("text").unwrap(), None);
        assert_eq!(speech.status(), SpeechStatus::Generating);

        speech.finish_generation(ticket, Ok(clip())).unwrap();
        speech.toggle("text").unwrap();
        assert_eq!(speech.status(), SpeechStatus::Paused);
        speech.toggle("text").unwrap();
        assert_eq!(speech.status(), SpeechStatus::Playing);

        let other = speech.toggle("other").unwrap();
        assert!(other.is_some());
        assert_eq!(speech.active_text(), Some("other"));
    }
}
