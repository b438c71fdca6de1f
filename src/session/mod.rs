//! Boss battle session
//!
//! Couples one encounter to its narration and timed phase changes. All timing
//! runs on the scheduler's virtual clock: the presenter calls `advance` with
//! elapsed time and reacts to the returned events.
//!
//! Input is accepted only when the encounter is in `Action`, no reveal is
//! running, and the post-turn unlock delay has passed.

use crate::combat::{Action, BossProfile, Dice, Encounter, Outcome, Phase, Resolution};
use crate::core::clock::Millis;
use crate::core::config::TimingConfig;
use crate::core::error::{GameError, Result};
use crate::narration::{RevealEvent, Typewriter};
use crate::schedule::Scheduler;

/// What the presenter should react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new narration text began revealing from empty
    TextChanged(String),
    RevealStarted,
    RevealCompleted,
    /// The boss enraged this turn; shown before the turn outcome
    EnrageBanner(String),
    /// Actions may be chosen again
    InputUnlocked,
    /// The victory or defeat text began revealing
    Concluded(Outcome),
    /// The restart control is available
    ResetUnlocked,
}

/// Timed steps queued on the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cue {
    ShowOutcome { text: String, terminal: bool },
    UnlockInput,
    ShowConclusion,
}

/// What finishing the current reveal leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterReveal {
    Nothing,
    BeginEncounter,
    UnlockInput,
    Conclude,
    UnlockReset,
}

/// One boss battle, from intro reveal to restart
pub struct BattleSession {
    encounter: Encounter,
    narrator: Typewriter,
    scheduler: Scheduler<Cue>,
    timing: TimingConfig,
    after_reveal: AfterReveal,
    input_locked: bool,
    banner: Option<String>,
    reset_unlocked: bool,
    events: Vec<SessionEvent>,
}

impl BattleSession {
    /// Start a battle against `boss`, revealing its intro first
    pub fn new(boss: BossProfile, timing: TimingConfig) -> Self {
        let mut session = Self {
            encounter: Encounter::new(boss),
            narrator: Typewriter::new(timing.reveal_interval_ms),
            scheduler: Scheduler::new(),
            timing,
            after_reveal: AfterReveal::Nothing,
            input_locked: true,
            banner: None,
            reset_unlocked: false,
            events: Vec::new(),
        };
        session.show_intro();
        session
    }

    fn show_intro(&mut self) {
        let intro = self.encounter.boss().intro.clone();
        self.reveal(intro, AfterReveal::BeginEncounter);
    }

    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    pub fn phase(&self) -> Phase {
        self.encounter.phase()
    }

    pub fn now(&self) -> Millis {
        self.scheduler.now()
    }

    /// Full text currently being narrated; also the text speech should voice
    pub fn current_text(&self) -> &str {
        self.narrator.text()
    }

    /// Portion of the narration revealed so far
    pub fn visible_text(&self) -> &str {
        self.narrator.visible()
    }

    pub fn is_writing(&self) -> bool {
        self.narrator.is_writing()
    }

    /// Enrage banner waiting to give way to the turn outcome
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn is_input_locked(&self) -> bool {
        self.input_locked
            || self.narrator.is_writing()
            || self.encounter.phase() != Phase::Action
    }

    /// Actions the player may pick right now
    pub fn available_actions(&self) -> Vec<Action> {
        if self.is_input_locked() {
            return Vec::new();
        }
        self.encounter.available_actions()
    }

    pub fn reset_unlocked(&self) -> bool {
        self.reset_unlocked
    }

    /// Take the player's action for this turn
    pub fn choose(&mut self, action: Action, dice: &mut dyn Dice) -> Result<Resolution> {
        if self.is_input_locked() {
            return Err(GameError::NotAcceptingInput(self.encounter.phase()));
        }
        if !self.encounter.is_available(action) {
            return Err(GameError::AbilityUnavailable(format!(
                "{} is on cooldown for {} more turn(s)",
                action,
                self.encounter.state().special_cooldown
            )));
        }

        let resolution = self.encounter.submit(action, dice, self.now())?;
        self.input_locked = true;

        let terminal = resolution.is_terminal();
        match &resolution.announcement {
            Some(banner) => {
                self.banner = Some(banner.clone());
                self.narrator.clear();
                self.events.push(SessionEvent::EnrageBanner(banner.clone()));
                self.scheduler.schedule(
                    self.timing.enrage_hold_ms,
                    Cue::ShowOutcome {
                        text: resolution.narrative.clone(),
                        terminal,
                    },
                );
            }
            None => self.show_outcome(resolution.narrative.clone(), terminal),
        }

        Ok(resolution)
    }

    /// Move virtual time forward and collect what happened
    pub fn advance(&mut self, dt: Millis) -> Vec<SessionEvent> {
        let target = self.now().saturating_add(dt);
        while let Some(at) = self.next_boundary(target) {
            self.step_to(at);
        }
        self.step_to(target);
        self.take_events()
    }

    /// Events raised by `choose` or `restart` that no `advance` returned yet
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start over against `boss` once the end screen allows it
    pub fn restart(&mut self, boss: BossProfile) -> Result<()> {
        if !self.reset_unlocked {
            return Err(GameError::InvalidTransition(
                "restart is locked until the encounter concludes".into(),
            ));
        }

        tracing::info!("Restarting encounter");
        self.scheduler.cancel_all();
        self.encounter = Encounter::new(boss);
        self.input_locked = true;
        self.banner = None;
        self.reset_unlocked = false;
        self.show_intro();
        Ok(())
    }

    fn next_boundary(&self, target: Millis) -> Option<Millis> {
        [self.scheduler.next_due(), self.narrator.next_event_at()]
            .into_iter()
            .flatten()
            .filter(|&at| at <= target)
            .min()
    }

    fn step_to(&mut self, at: Millis) {
        for event in self.narrator.advance_to(at) {
            self.on_reveal(event);
        }
        for cue in self.scheduler.advance_to(at) {
            self.on_cue(cue);
        }
    }

    fn reveal(&mut self, text: String, after: AfterReveal) {
        self.narrator.start(text.clone(), self.now());
        self.after_reveal = after;
        self.events.push(SessionEvent::TextChanged(text));
    }

    fn show_outcome(&mut self, text: String, terminal: bool) {
        self.banner = None;
        let after = if terminal {
            AfterReveal::Conclude
        } else {
            AfterReveal::UnlockInput
        };
        self.reveal(text, after);
    }

    fn on_reveal(&mut self, event: RevealEvent) {
        match event {
            RevealEvent::Started { .. } => self.events.push(SessionEvent::RevealStarted),
            RevealEvent::Completed { at } => {
                self.events.push(SessionEvent::RevealCompleted);
                let after = std::mem::replace(&mut self.after_reveal, AfterReveal::Nothing);
                match after {
                    AfterReveal::Nothing => {}
                    AfterReveal::BeginEncounter => {
                        if self.encounter.begin().is_ok() {
                            self.input_locked = false;
                            self.events.push(SessionEvent::InputUnlocked);
                        }
                    }
                    AfterReveal::UnlockInput => {
                        self.scheduler.schedule_at(
                            at.saturating_add(self.timing.input_unlock_ms),
                            Cue::UnlockInput,
                        );
                    }
                    AfterReveal::Conclude => {
                        self.scheduler.schedule_at(
                            at.saturating_add(self.timing.conclusion_delay_ms),
                            Cue::ShowConclusion,
                        );
                    }
                    AfterReveal::UnlockReset => {
                        self.reset_unlocked = true;
                        self.events.push(SessionEvent::ResetUnlocked);
                    }
                }
            }
        }
    }

    fn on_cue(&mut self, cue: Cue) {
        match cue {
            Cue::ShowOutcome { text, terminal } => self.show_outcome(text, terminal),
            Cue::UnlockInput => {
                if self.encounter.ready().is_ok() {
                    self.input_locked = false;
                    self.events.push(SessionEvent::InputUnlocked);
                }
            }
            Cue::ShowConclusion => {
                let outcome = self.encounter.outcome();
                if let Some(text) = self.encounter.conclusion().map(str::to_string) {
                    self.reveal(text, AfterReveal::UnlockReset);
                    self.events.push(SessionEvent::Concluded(outcome));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{BossRoster, ScriptedDice};

    fn timing() -> TimingConfig {
        TimingConfig {
            reveal_interval_ms: 1,
            ..TimingConfig::default()
        }
    }

    fn session() -> BattleSession {
        BattleSession::new(BossRoster::default().profile(0).unwrap(), timing())
    }

    #[test]
    fn test_input_locked_during_intro() {
        let mut session = session();
        assert_eq!(session.phase(), Phase::Intro);
        assert!(session.is_input_locked());

        let mut dice = ScriptedDice::new([13]);
        assert!(matches!(
            session.choose(Action::Dodge, &mut dice),
            Err(GameError::NotAcceptingInput(Phase::Intro))
        ));

        let events = session.advance(10_000);
        assert!(events.contains(&SessionEvent::InputUnlocked));
        assert_eq!(session.phase(), Phase::Action);
        assert!(!session.is_input_locked());
    }

    #[test]
    fn test_turn_relocks_until_reveal_and_delay() {
        let mut session = session();
        session.advance(10_000);

        let mut dice = ScriptedDice::new([13]);
        let resolution = session.choose(Action::Dodge, &mut dice).unwrap();
        assert!(session.is_input_locked());
        assert_eq!(session.current_text(), resolution.narrative);

        let len = resolution.narrative.chars().count() as Millis;
        let events = session.advance(len);
        assert!(events.contains(&SessionEvent::RevealCompleted));
        assert!(session.is_input_locked());

        assert!(session.advance(2_999).is_empty());
        assert_eq!(session.advance(1), vec![SessionEvent::InputUnlocked]);
        assert!(!session.is_input_locked());
    }

    #[test]
    fn test_special_on_cooldown_refused_by_session() {
        let mut session = session();
        session.advance(10_000);
        let mut dice = ScriptedDice::new([1, 1, 1]);
        session.choose(Action::Special, &mut dice).unwrap();
        session.advance(100_000);

        let err = session.choose(Action::Special, &mut dice).unwrap_err();
        assert!(matches!(err, GameError::AbilityUnavailable(_)));
        assert_eq!(session.encounter().turn(), 2);
    }

    #[test]
    fn test_restart_locked_until_concluded() {
        let mut session = session();
        let boss = BossRoster::default().profile(1).unwrap();
        assert!(session.restart(boss).is_err());
    }
}
