//! Boss battle combat core
//!
//! Dice feed the resolver, the resolver feeds the encounter, and the
//! encounter owns the only mutable state.

pub mod action;
pub mod boss;
pub mod constants;
pub mod dice;
pub mod encounter;
pub mod resolution;
pub mod state;

pub use action::Action;
pub use boss::{BossEntry, BossProfile, BossRoster};
pub use dice::{Dice, RngDice, ScriptedDice};
pub use encounter::Encounter;
pub use resolution::{resolve, should_enrage, Resolution};
pub use state::{decide_outcome, EncounterState, HistoryEntry, Outcome, Phase};
