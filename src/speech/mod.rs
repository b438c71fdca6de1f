//! Narration speech: playback state machine, audio sinks and the TTS client

pub mod controller;
pub mod sink;
pub mod synth;

pub use controller::{SpeechController, SpeechState, SpeechStatus, SpeechTicket};
pub use sink::{AudioClip, AudioSink, RecordingSink, SinkCommand};
pub use synth::{build_ssml, speak, SpeechClient, SpeechSynthesizer, TokenSource};
