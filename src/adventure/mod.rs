//! Ten-round choose-your-path adventure
//!
//! A backstory, then up to ten generated rounds of two choices each. A wrong
//! choice ends the run; surviving round ten wins it. Delays between rounds run
//! on the scheduler's virtual clock, while round generation is awaited.

use crate::combat::Dice;
use crate::core::clock::Millis;
use crate::core::config::TimingConfig;
use crate::core::error::{GameError, Result};
use crate::llm::story::{RoundChoice, RoundData, RoundHistory, StoryGenerator, MAX_ROUNDS};
use crate::schedule::Scheduler;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AdventurePhase {
    /// Waiting on the story generator
    #[default]
    Loading,
    /// Backstory shown, waiting for the player to begin
    Backstory,
    /// Choices shown
    Round,
    /// A choice was made; its reason is shown until the next step fires
    Reveal,
    /// The last request failed and can be retried
    FetchFailed,
    Over { victory: bool },
}

/// What the presenter should react to after `advance`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdventureEvent {
    RoundReady(u32),
    FetchFailed(String),
    GameOver { victory: bool },
}

/// The request a retry repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Backstory,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    NextRound,
    GameOver { victory: bool },
}

pub struct Adventure<G, D> {
    generator: G,
    dice: D,
    timing: TimingConfig,
    scheduler: Scheduler<Cue>,
    phase: AdventurePhase,
    pending: Pending,
    round: u32,
    history: Vec<RoundHistory>,
    backstory: Option<String>,
    story: Option<String>,
    /// Current round's choices in display order
    choices: Vec<RoundChoice>,
    selected: Option<usize>,
    last_error: Option<String>,
}

impl<G: StoryGenerator, D: Dice> Adventure<G, D> {
    pub fn new(generator: G, dice: D, timing: TimingConfig) -> Self {
        Self {
            generator,
            dice,
            timing,
            scheduler: Scheduler::new(),
            phase: AdventurePhase::Loading,
            pending: Pending::Backstory,
            round: 0,
            history: Vec::new(),
            backstory: None,
            story: None,
            choices: Vec::new(),
            selected: None,
            last_error: None,
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn phase(&self) -> AdventurePhase {
        self.phase
    }

    /// Current round, 0 before the journey starts
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn history(&self) -> &[RoundHistory] {
        &self.history
    }

    pub fn backstory(&self) -> Option<&str> {
        self.backstory.as_deref()
    }

    /// Story text of the current round
    pub fn story(&self) -> Option<&str> {
        self.story.as_deref()
    }

    pub fn choices(&self) -> &[RoundChoice] {
        &self.choices
    }

    pub fn selected(&self) -> Option<&RoundChoice> {
        self.selected.and_then(|i| self.choices.get(i))
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn now(&self) -> Millis {
        self.scheduler.now()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, AdventurePhase::Over { .. })
    }

    /// Fetch the opening backstory (round 1 with no history)
    pub async fn load_backstory(&mut self) -> Result<()> {
        self.phase = AdventurePhase::Loading;
        self.pending = Pending::Backstory;

        match self.generator.generate_round(&[], 1).await {
            Ok(data) => {
                tracing::info!("Backstory loaded");
                self.backstory = Some(data.story);
                self.last_error = None;
                self.phase = AdventurePhase::Backstory;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Leave the backstory and fetch round 1
    pub async fn start(&mut self) -> Result<()> {
        if self.phase != AdventurePhase::Backstory {
            return Err(GameError::InvalidTransition(format!(
                "cannot start the journey while {:?}",
                self.phase
            )));
        }
        self.round = 1;
        self.fetch_round().await
    }

    /// Pick the choice at `index` in display order
    pub fn choose(&mut self, index: usize) -> Result<&RoundChoice> {
        if self.phase != AdventurePhase::Round {
            return Err(GameError::InvalidTransition(format!(
                "cannot choose while {:?}",
                self.phase
            )));
        }
        let choice = self.choices.get(index).ok_or_else(|| {
            GameError::InvalidAction(format!("no choice {} in this round", index + 1))
        })?;

        self.history.push(RoundHistory::from(choice));
        let cue = if !choice.is_correct {
            tracing::info!("Round {}: wrong path, the journey ends", self.round);
            (self.timing.adventure_end_delay_ms, Cue::GameOver { victory: false })
        } else if self.round >= MAX_ROUNDS {
            tracing::info!("Round {}: final round survived", self.round);
            (self.timing.adventure_end_delay_ms, Cue::GameOver { victory: true })
        } else {
            tracing::info!("Round {}: survived", self.round);
            (self.timing.next_round_delay_ms, Cue::NextRound)
        };
        self.scheduler.schedule(cue.0, cue.1);

        self.selected = Some(index);
        self.phase = AdventurePhase::Reveal;
        Ok(&self.choices[index])
    }

    /// Move virtual time forward, fetching the next round when it comes due
    pub async fn advance(&mut self, dt: Millis) -> Vec<AdventureEvent> {
        let mut events = Vec::new();
        for cue in self.scheduler.advance(dt) {
            match cue {
                Cue::GameOver { victory } => {
                    self.phase = AdventurePhase::Over { victory };
                    events.push(AdventureEvent::GameOver { victory });
                }
                Cue::NextRound => {
                    self.round += 1;
                    match self.fetch_round().await {
                        Ok(()) => events.push(AdventureEvent::RoundReady(self.round)),
                        Err(e) => events.push(AdventureEvent::FetchFailed(e.to_string())),
                    }
                }
            }
        }
        events
    }

    /// Repeat the request that failed, with the same round and history
    pub async fn retry(&mut self) -> Result<()> {
        if self.phase != AdventurePhase::FetchFailed {
            return Err(GameError::InvalidTransition(format!(
                "nothing to retry while {:?}",
                self.phase
            )));
        }
        match self.pending {
            Pending::Backstory => self.load_backstory().await,
            Pending::Round => self.fetch_round().await,
        }
    }

    /// Forget the journey and fetch a fresh backstory
    pub async fn reset(&mut self) -> Result<()> {
        tracing::info!("Resetting adventure");
        self.scheduler.cancel_all();
        self.round = 0;
        self.history.clear();
        self.backstory = None;
        self.story = None;
        self.choices.clear();
        self.selected = None;
        self.last_error = None;
        self.load_backstory().await
    }

    async fn fetch_round(&mut self) -> Result<()> {
        self.phase = AdventurePhase::Loading;
        self.pending = Pending::Round;
        self.choices.clear();
        self.selected = None;

        match self.generator.generate_round(&self.history, self.round).await {
            Ok(data) => {
                tracing::debug!("Round {} ready", self.round);
                self.present(data);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn present(&mut self, data: RoundData) {
        let RoundData {
            story,
            choice1,
            choice2,
        } = data;
        self.choices = if self.dice.roll(2) == 1 {
            vec![choice1, choice2]
        } else {
            vec![choice2, choice1]
        };
        self.story = Some(story);
        self.last_error = None;
        self.phase = AdventurePhase::Round;
    }

    fn fail(&mut self, error: GameError) -> GameError {
        tracing::warn!("Story generation failed: {}", error);
        self.last_error = Some(error.to_string());
        self.phase = AdventurePhase::FetchFailed;
        error
    }
}
