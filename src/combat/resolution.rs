//! Turn resolution
//!
//! Maps one action and the pre-turn state to damage, healing, narration and
//! the post-turn values. Pure apart from the dice it is handed: the caller
//! decides whether to commit the result.
//!
//! Roll order per action is fixed so scripted dice reproduce exact turns:
//! - Attack: hit roll, damage roll, counter roll, counter damage (if countered)
//! - Dodge: dodge roll, damage roll (if the dodge fails)
//! - Heal: heal roll, boss damage roll
//! - Special: special roll, damage roll, retaliation roll
//! - Special on cooldown: boss damage roll

use crate::combat::action::Action;
use crate::combat::boss::BossProfile;
use crate::combat::constants::*;
use crate::combat::dice::Dice;
use crate::combat::state::{decide_outcome, EncounterState, Outcome};

/// Everything a single turn produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub action: Action,
    /// Damage dealt to the boss
    pub player_damage: u32,
    /// Damage dealt to the player, enrage doubling included
    pub boss_damage: u32,
    pub heal: u32,
    /// A special attack was unleashed (not blocked by cooldown)
    pub special: bool,
    /// Special was requested while still on cooldown
    pub on_cooldown: bool,
    /// This turn flipped the enrage latch
    pub enrage_triggered: bool,
    /// Boss is enraged after this turn
    pub enraged: bool,
    /// Enrage banner text, present only on the triggering turn
    pub announcement: Option<String>,
    /// Turn narration without the announcement
    pub narrative: String,
    pub player_health: u32,
    pub boss_health: u32,
    pub special_cooldown: u32,
    pub outcome: Outcome,
}

impl Resolution {
    /// Narration with the enrage announcement in front, as stored in history
    pub fn full_narrative(&self) -> String {
        match &self.announcement {
            Some(banner) if !banner.is_empty() => format!("{} {}", banner, self.narrative),
            _ => self.narrative.clone(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_decided()
    }
}

/// Damage exchange for one action, before health is applied
struct Exchange {
    player_damage: u32,
    boss_damage: u32,
    heal: u32,
    special: bool,
    on_cooldown: bool,
    fragment: String,
}

/// Should this turn enrage the boss?
pub fn should_enrage(state: &EncounterState) -> bool {
    state.boss_health <= ENRAGE_THRESHOLD && !state.enrage_triggered
}

/// Resolve one action against the pre-turn state
pub fn resolve(
    action: Action,
    state: &EncounterState,
    boss: &BossProfile,
    dice: &mut dyn Dice,
) -> Resolution {
    let enrage_triggered = should_enrage(state);
    let enraged = state.enraged || enrage_triggered;
    let boss_hit = |base: u32| {
        if enraged {
            base * ENRAGE_DAMAGE_MULTIPLIER
        } else {
            base
        }
    };

    let exchange = match action {
        Action::Attack => {
            let attack_roll = dice.roll(ATTACK_ROLL_SIDES);
            let player_damage = if attack_roll > ATTACK_HIT_THRESHOLD {
                dice.roll(ATTACK_STRONG_SIDES) + ATTACK_STRONG_BONUS
            } else {
                dice.roll(ATTACK_WEAK_SIDES)
            };
            let counter_roll = dice.roll(COUNTER_ROLL_SIDES);
            let boss_damage = if counter_roll > COUNTER_THRESHOLD {
                boss_hit(dice.roll(COUNTER_DAMAGE_SIDES))
            } else {
                0
            };

            let mut fragment = format!(
                "You attack! Roll: {}. You deal {} damage.",
                attack_roll, player_damage
            );
            if boss_damage > 0 {
                fragment.push_str(&format!(" Boss counters for {} damage.", boss_damage));
            }
            Exchange {
                player_damage,
                boss_damage,
                heal: 0,
                special: false,
                on_cooldown: false,
                fragment,
            }
        }
        Action::Dodge => {
            let dodge_roll = dice.roll(DODGE_ROLL_SIDES);
            let (boss_damage, fragment) = if dodge_roll > DODGE_THRESHOLD {
                (
                    0,
                    "You successfully dodge the boss's attack! No damage taken.".to_string(),
                )
            } else {
                let damage = boss_hit(dice.roll(DODGE_FAIL_DAMAGE_SIDES));
                (
                    damage,
                    format!("Dodge failed. Boss hits you for {} damage.", damage),
                )
            };
            Exchange {
                player_damage: 0,
                boss_damage,
                heal: 0,
                special: false,
                on_cooldown: false,
                fragment,
            }
        }
        Action::Heal => {
            let heal = dice.roll(HEAL_SIDES) + HEAL_BONUS;
            let boss_damage = boss_hit(dice.roll(HEAL_PUNISH_SIDES));
            Exchange {
                player_damage: 0,
                boss_damage,
                heal,
                special: false,
                on_cooldown: false,
                fragment: format!(
                    "You heal for {} health. Boss attacks for {} damage.",
                    heal, boss_damage
                ),
            }
        }
        Action::Special if state.special_cooldown > 0 => {
            let boss_damage = boss_hit(dice.roll(SPECIAL_COOLDOWN_PUNISH_SIDES));
            Exchange {
                player_damage: 0,
                boss_damage,
                heal: 0,
                special: false,
                on_cooldown: true,
                fragment: format!(
                    "Special Attack is on cooldown! You miss your turn. Boss attacks for {} damage.",
                    boss_damage
                ),
            }
        }
        Action::Special => {
            let special_roll = dice.roll(SPECIAL_ROLL_SIDES);
            let player_damage = if special_roll > SPECIAL_HIT_THRESHOLD {
                dice.roll(SPECIAL_STRONG_SIDES) + SPECIAL_STRONG_BONUS
            } else {
                dice.roll(SPECIAL_WEAK_SIDES)
            };
            let boss_damage = boss_hit(dice.roll(SPECIAL_RETALIATION_SIDES));
            Exchange {
                player_damage,
                boss_damage,
                heal: 0,
                special: true,
                on_cooldown: false,
                fragment: format!(
                    "You unleash a special attack! Roll: {}. You deal {} damage. Boss retaliates weakly for {} damage.",
                    special_roll, player_damage, boss_damage
                ),
            }
        }
    };

    // Both pools change from the pre-turn snapshot
    let player_health = (state.player_health + exchange.heal)
        .saturating_sub(exchange.boss_damage)
        .min(PLAYER_MAX_HEALTH);
    let boss_health = state
        .boss_health
        .saturating_sub(exchange.player_damage)
        .min(BOSS_MAX_HEALTH);
    let outcome = decide_outcome(player_health, boss_health);

    let special_cooldown = if outcome.is_decided() {
        state.special_cooldown
    } else if exchange.special && state.special_cooldown == 0 {
        SPECIAL_COOLDOWN_TURNS
    } else {
        state.special_cooldown.saturating_sub(1)
    };

    let ambience = boss.ambience_for(state.turn);
    let summary = format!(
        "{} Your health: {}, Boss health: {}.",
        exchange.fragment, player_health, boss_health
    );
    let narrative = if ambience.is_empty() {
        summary
    } else {
        format!("{} {}", ambience, summary)
    };
    let announcement = enrage_triggered.then(|| boss.enrage_line_for(state.turn).to_string());

    Resolution {
        action,
        player_damage: exchange.player_damage,
        boss_damage: exchange.boss_damage,
        heal: exchange.heal,
        special: exchange.special,
        on_cooldown: exchange.on_cooldown,
        enrage_triggered,
        enraged,
        announcement,
        narrative,
        player_health,
        boss_health,
        special_cooldown,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::boss::BossRoster;
    use crate::combat::dice::ScriptedDice;

    fn boss() -> BossProfile {
        BossRoster::default().profile(0).unwrap()
    }

    fn state() -> EncounterState {
        EncounterState {
            phase: crate::combat::state::Phase::Action,
            ..EncounterState::default()
        }
    }

    #[test]
    fn test_attack_strong_hit_no_counter() {
        // hit 15 (>10) -> d15 = 15, +5 = 20; counter roll 3 (<=5) -> no counter
        let mut dice = ScriptedDice::new([15, 15, 3]);
        let r = resolve(Action::Attack, &state(), &boss(), &mut dice);
        assert_eq!(r.player_damage, 20);
        assert_eq!(r.boss_damage, 0);
        assert_eq!(r.boss_health, 130);
        assert_eq!(r.player_health, 100);
        assert_eq!(dice.consumed(), 3);
        assert!(!r.narrative.contains("counters"));
    }

    #[test]
    fn test_attack_weak_hit_with_counter() {
        // hit 10 (not >10) -> d10 = 4; counter 6 -> d10 = 7
        let mut dice = ScriptedDice::new([10, 4, 6, 7]);
        let r = resolve(Action::Attack, &state(), &boss(), &mut dice);
        assert_eq!(r.player_damage, 4);
        assert_eq!(r.boss_damage, 7);
        assert_eq!(r.player_health, 93);
        assert!(r.narrative.contains("Boss counters for 7 damage."));
    }

    #[test]
    fn test_dodge_success_and_failure() {
        let mut dice = ScriptedDice::new([13]);
        let r = resolve(Action::Dodge, &state(), &boss(), &mut dice);
        assert_eq!(r.boss_damage, 0);
        assert_eq!(dice.consumed(), 1);

        let mut dice = ScriptedDice::new([12, 9]);
        let r = resolve(Action::Dodge, &state(), &boss(), &mut dice);
        assert_eq!(r.boss_damage, 9);
        assert!(r.narrative.contains("Dodge failed. Boss hits you for 9 damage."));
    }

    #[test]
    fn test_heal_applies_before_clamp() {
        let mut s = state();
        s.player_health = 95;
        // heal 1 + 10 = 11, boss hits 8 -> 95 + 11 - 8 = 98
        let mut dice = ScriptedDice::new([1, 8]);
        let r = resolve(Action::Heal, &s, &boss(), &mut dice);
        assert_eq!(r.heal, 11);
        assert_eq!(r.player_health, 98);

        // heal 20, boss 1 -> clamps at 100
        let mut dice = ScriptedDice::new([10, 1]);
        let r = resolve(Action::Heal, &s, &boss(), &mut dice);
        assert_eq!(r.player_health, 100);
    }

    #[test]
    fn test_special_sets_cooldown() {
        // roll 9 (>8) -> d25 = 25 + 10 = 35; retaliation 5
        let mut dice = ScriptedDice::new([9, 25, 5]);
        let r = resolve(Action::Special, &state(), &boss(), &mut dice);
        assert!(r.special);
        assert_eq!(r.player_damage, 35);
        assert_eq!(r.boss_damage, 5);
        assert_eq!(r.special_cooldown, SPECIAL_COOLDOWN_TURNS);
    }

    #[test]
    fn test_special_on_cooldown_consumes_turn() {
        let mut s = state();
        s.special_cooldown = 2;
        let mut dice = ScriptedDice::new([12]);
        let r = resolve(Action::Special, &s, &boss(), &mut dice);
        assert!(r.on_cooldown);
        assert!(!r.special);
        assert_eq!(r.player_damage, 0);
        assert_eq!(r.boss_damage, 12);
        assert_eq!(r.special_cooldown, 1);
        assert!(r.narrative.contains("on cooldown"));
    }

    #[test]
    fn test_cooldown_decays_on_other_actions() {
        let mut s = state();
        s.special_cooldown = 1;
        let mut dice = ScriptedDice::new([13]);
        let r = resolve(Action::Dodge, &s, &boss(), &mut dice);
        assert_eq!(r.special_cooldown, 0);
    }

    #[test]
    fn test_enrage_doubles_damage_on_trigger_turn() {
        let mut s = state();
        s.boss_health = 75;
        let mut dice = ScriptedDice::new([1, 8]);
        let r = resolve(Action::Heal, &s, &boss(), &mut dice);
        assert!(r.enrage_triggered);
        assert!(r.enraged);
        assert_eq!(r.boss_damage, 16);
        assert!(r.announcement.is_some());
        assert!(r.full_narrative().starts_with(r.announcement.as_deref().unwrap()));
    }

    #[test]
    fn test_enrage_latch_fires_once() {
        let mut s = state();
        s.boss_health = 40;
        s.enraged = true;
        s.enrage_triggered = true;
        let mut dice = ScriptedDice::new([1, 3]);
        let r = resolve(Action::Heal, &s, &boss(), &mut dice);
        assert!(!r.enrage_triggered);
        assert!(r.enraged);
        assert!(r.announcement.is_none());
        assert_eq!(r.boss_damage, 6);
    }

    #[test]
    fn test_no_enrage_above_threshold() {
        let mut s = state();
        s.boss_health = 76;
        let mut dice = ScriptedDice::new([1, 3]);
        let r = resolve(Action::Heal, &s, &boss(), &mut dice);
        assert!(!r.enraged);
        assert_eq!(r.boss_damage, 3);
    }

    #[test]
    fn test_narrative_uses_turn_ambience() {
        let b = boss();
        let mut s = state();
        s.turn = 4;
        let mut dice = ScriptedDice::new([13]);
        let r = resolve(Action::Dodge, &s, &b, &mut dice);
        assert!(r.narrative.starts_with(b.ambience_for(4)));
        assert!(r.narrative.ends_with("Your health: 100, Boss health: 150."));
    }

    #[test]
    fn test_terminal_turn_freezes_cooldown() {
        let mut s = state();
        s.boss_health = 10;
        s.enraged = true;
        s.enrage_triggered = true;
        s.special_cooldown = 0;
        let mut dice = ScriptedDice::new([20, 15, 1]);
        let r = resolve(Action::Special, &s, &boss(), &mut dice);
        assert_eq!(r.outcome, Outcome::Victory);
        assert_eq!(r.special_cooldown, 0);
    }
}
