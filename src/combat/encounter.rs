//! Encounter state machine
//!
//! `Intro -> Action -> Resolving -> Action ... -> Terminal`. Only one action is
//! accepted per turn: `submit` requires `Action` and leaves the encounter in
//! `Resolving` until the presenter calls `ready`.

use crate::combat::action::Action;
use crate::combat::boss::BossProfile;
use crate::combat::dice::Dice;
use crate::combat::resolution::{resolve, Resolution};
use crate::combat::state::{EncounterState, HistoryEntry, Outcome, Phase};
use crate::core::clock::Millis;
use crate::core::error::{GameError, Result};

/// One boss battle
#[derive(Debug, Clone)]
pub struct Encounter {
    boss: BossProfile,
    state: EncounterState,
}

impl Encounter {
    /// Start a fresh encounter in the intro phase
    pub fn new(boss: BossProfile) -> Self {
        tracing::info!("Encounter begins against {}", boss.name);
        Self {
            boss,
            state: EncounterState::new(),
        }
    }

    /// Resume from an existing state, normalized into the encounter invariants
    pub fn from_state(boss: BossProfile, state: EncounterState) -> Self {
        Self {
            boss,
            state: state.normalized(),
        }
    }

    pub fn boss(&self) -> &BossProfile {
        &self.boss
    }

    pub fn state(&self) -> &EncounterState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn outcome(&self) -> Outcome {
        self.state.outcome
    }

    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Finish the intro and start accepting actions
    pub fn begin(&mut self) -> Result<()> {
        match self.state.phase {
            Phase::Intro => {
                self.state.phase = Phase::Action;
                Ok(())
            }
            other => Err(GameError::InvalidTransition(format!(
                "cannot begin encounter from {:?}",
                other
            ))),
        }
    }

    /// Can the player pick this action right now?
    pub fn is_available(&self, action: Action) -> bool {
        self.state.phase == Phase::Action
            && !(action.is_special() && self.state.special_cooldown > 0)
    }

    pub fn available_actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|&action| self.is_available(action))
            .collect()
    }

    /// Resolve and commit one action
    ///
    /// Special on cooldown is not refused here: it resolves as a wasted turn
    /// while the boss still attacks. Callers that gate input should check
    /// `is_available` first.
    pub fn submit(
        &mut self,
        action: Action,
        dice: &mut dyn Dice,
        now: Millis,
    ) -> Result<Resolution> {
        if self.state.phase != Phase::Action {
            return Err(GameError::NotAcceptingInput(self.state.phase));
        }

        let resolution = resolve(action, &self.state, &self.boss, dice);
        let turn = self.state.turn;
        self.state.commit(&resolution, now);

        if resolution.enrage_triggered {
            tracing::info!("{} enrages on turn {}", self.boss.name, turn);
        }
        tracing::debug!(
            "Turn {}: {} dealt {}, took {}, healed {} (player {}, boss {})",
            turn,
            action,
            resolution.player_damage,
            resolution.boss_damage,
            resolution.heal,
            resolution.player_health,
            resolution.boss_health
        );
        if resolution.is_terminal() {
            tracing::info!(
                "Encounter against {} ends in {:?} on turn {}",
                self.boss.name,
                resolution.outcome,
                turn
            );
        }

        Ok(resolution)
    }

    /// Presentation of the last turn finished; accept the next action
    pub fn ready(&mut self) -> Result<()> {
        match self.state.phase {
            Phase::Resolving => {
                self.state.phase = Phase::Action;
                Ok(())
            }
            other => Err(GameError::InvalidTransition(format!(
                "cannot ready encounter from {:?}",
                other
            ))),
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.history
    }

    /// The last `n` turns, oldest first
    pub fn recent_history(&self, n: usize) -> &[HistoryEntry] {
        let history = &self.state.history;
        &history[history.len().saturating_sub(n)..]
    }

    /// Battle log lines, one per completed turn
    pub fn battle_log(&self) -> Vec<String> {
        self.state
            .history
            .iter()
            .map(|entry| {
                format!(
                    "Turn {} - {}: {}",
                    entry.turn_number, entry.action, entry.narrative
                )
            })
            .collect()
    }

    /// Text for the end screen, once the encounter is over
    pub fn conclusion(&self) -> Option<&str> {
        match self.state.outcome {
            Outcome::Victory => Some(&self.boss.victory),
            Outcome::Defeat => Some(&self.boss.defeat),
            Outcome::Undecided => None,
        }
    }
}
