//! Encounter state and the battle history
//!
//! `EncounterState` is owned by exactly one `Encounter` and only changes
//! through `commit`, one resolved action at a time.

use crate::combat::action::Action;
use crate::combat::constants::{BOSS_MAX_HEALTH, ENRAGE_THRESHOLD, PLAYER_MAX_HEALTH};
use crate::combat::resolution::Resolution;
use crate::core::clock::Millis;
use serde::{Deserialize, Serialize};

/// Where the encounter is in its turn loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Phase {
    /// Pre-battle narration, no actions yet
    #[default]
    Intro,
    /// Waiting for the player's next action
    Action,
    /// An action was committed and is being presented
    Resolving,
    /// Victory or defeat; absorbing
    Terminal,
}

/// How the encounter ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Outcome {
    #[default]
    Undecided,
    Victory,
    Defeat,
}

impl Outcome {
    pub fn is_decided(&self) -> bool {
        !matches!(self, Outcome::Undecided)
    }
}

/// One completed turn in the battle log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub turn_number: u32,
    pub action: Action,
    /// Damage the player dealt to the boss
    pub player_damage_dealt: u32,
    /// Damage the boss dealt to the player
    pub boss_damage_dealt: u32,
    pub healing_applied: u32,
    /// A special attack actually landed this turn
    pub is_special: bool,
    /// Full narration shown for the turn, enrage announcement included
    pub narrative: String,
    /// Virtual time of the commit
    pub timestamp: Millis,
}

/// Mutable state of one boss battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterState {
    pub player_health: u32,
    pub boss_health: u32,
    /// Starts at 1; frozen once the encounter is terminal
    pub turn: u32,
    /// Turns until Special can be used again
    pub special_cooldown: u32,
    /// Sticky once set
    pub enraged: bool,
    /// Latch so the enrage announcement fires once per encounter
    pub enrage_triggered: bool,
    pub phase: Phase,
    pub outcome: Outcome,
    pub history: Vec<HistoryEntry>,
}

impl Default for EncounterState {
    fn default() -> Self {
        Self {
            player_health: PLAYER_MAX_HEALTH,
            boss_health: BOSS_MAX_HEALTH,
            turn: 1,
            special_cooldown: 0,
            enraged: false,
            enrage_triggered: false,
            phase: Phase::Intro,
            outcome: Outcome::Undecided,
            history: Vec::new(),
        }
    }
}

impl EncounterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    /// Bring an arbitrary state back inside the encounter invariants
    ///
    /// Health is clamped and the enrage flag and latch are made to agree: an
    /// enraged boss already below the threshold never announces again. Phase
    /// and outcome are derived from the health pools.
    pub fn normalized(mut self) -> Self {
        self.player_health = self.player_health.min(PLAYER_MAX_HEALTH);
        self.boss_health = self.boss_health.min(BOSS_MAX_HEALTH);
        self.turn = self.turn.max(1);
        self.enraged |= self.enrage_triggered;
        self.enrage_triggered |= self.enraged && self.boss_health <= ENRAGE_THRESHOLD;

        self.outcome = decide_outcome(self.player_health, self.boss_health);
        if self.outcome.is_decided() {
            self.phase = Phase::Terminal;
        } else if self.phase == Phase::Terminal {
            self.phase = Phase::Action;
        }
        self
    }

    /// Apply a resolution computed from this state
    pub(crate) fn commit(&mut self, resolution: &Resolution, timestamp: Millis) {
        self.player_health = resolution.player_health;
        self.boss_health = resolution.boss_health;
        self.special_cooldown = resolution.special_cooldown;
        self.enraged |= resolution.enraged;
        self.enrage_triggered |= resolution.enrage_triggered;

        self.history.push(HistoryEntry {
            turn_number: self.turn,
            action: resolution.action,
            player_damage_dealt: resolution.player_damage,
            boss_damage_dealt: resolution.boss_damage,
            healing_applied: resolution.heal,
            is_special: resolution.special,
            narrative: resolution.full_narrative(),
            timestamp,
        });

        self.outcome = resolution.outcome;
        if self.outcome.is_decided() {
            self.phase = Phase::Terminal;
        } else {
            self.turn += 1;
            self.phase = Phase::Resolving;
        }
    }
}

/// Defeat is checked first, so a double knockout is a defeat
pub fn decide_outcome(player_health: u32, boss_health: u32) -> Outcome {
    if player_health == 0 {
        Outcome::Defeat
    } else if boss_health == 0 {
        Outcome::Victory
    } else {
        Outcome::Undecided
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = EncounterState::new();
        assert_eq!(state.player_health, 100);
        assert_eq!(state.boss_health, 150);
        assert_eq!(state.turn, 1);
        assert_eq!(state.special_cooldown, 0);
        assert!(!state.enraged);
        assert_eq!(state.phase, Phase::Intro);
        assert_eq!(state.outcome, Outcome::Undecided);
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_double_knockout_is_defeat() {
        assert_eq!(decide_outcome(0, 0), Outcome::Defeat);
        assert_eq!(decide_outcome(1, 0), Outcome::Victory);
        assert_eq!(decide_outcome(1, 1), Outcome::Undecided);
    }

    #[test]
    fn test_normalized_clamps_and_derives_phase() {
        let state = EncounterState {
            player_health: 250,
            boss_health: 0,
            phase: Phase::Action,
            ..EncounterState::default()
        }
        .normalized();

        assert_eq!(state.player_health, 100);
        assert_eq!(state.phase, Phase::Terminal);
        assert_eq!(state.outcome, Outcome::Victory);
    }

    #[test]
    fn test_normalized_reopens_false_terminal() {
        let state = EncounterState {
            phase: Phase::Terminal,
            outcome: Outcome::Defeat,
            ..EncounterState::default()
        }
        .normalized();

        assert_eq!(state.phase, Phase::Action);
        assert_eq!(state.outcome, Outcome::Undecided);
    }

    #[test]
    fn test_normalized_latch_implies_enraged() {
        let state = EncounterState {
            enrage_triggered: true,
            ..EncounterState::default()
        }
        .normalized();
        assert!(state.enraged);
    }

    #[test]
    fn test_normalized_enraged_below_threshold_sets_latch() {
        let state = EncounterState {
            boss_health: 60,
            enraged: true,
            ..EncounterState::default()
        }
        .normalized();
        assert!(state.enrage_triggered);

        let above = EncounterState {
            boss_health: 120,
            enraged: true,
            ..EncounterState::default()
        }
        .normalized();
        assert!(!above.enrage_triggered);
    }
}
