pub mod clock;
pub mod config;
pub mod error;

pub use clock::{Clock, Millis};
pub use config::{GameConfig, SpeechConfig, TimingConfig};
pub use error::{GameError, Result};
