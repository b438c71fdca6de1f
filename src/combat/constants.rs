//! Combat constants - all balance values in one place
//!
//! Dice sizes and thresholds are part of the game's balance contract; the
//! resolver must produce identical numbers for identical rolls.

// Health pools
pub const PLAYER_MAX_HEALTH: u32 = 100;
pub const BOSS_MAX_HEALTH: u32 = 150;

// Enrage fires once when boss health is at or below this value
pub const ENRAGE_THRESHOLD: u32 = 75;
pub const ENRAGE_DAMAGE_MULTIPLIER: u32 = 2;

// Special attack cooldown, in turns
pub const SPECIAL_COOLDOWN_TURNS: u32 = 3;

// Attack
pub const ATTACK_ROLL_SIDES: u32 = 20;
pub const ATTACK_HIT_THRESHOLD: u32 = 10;
pub const ATTACK_STRONG_SIDES: u32 = 15;
pub const ATTACK_STRONG_BONUS: u32 = 5;
pub const ATTACK_WEAK_SIDES: u32 = 10;
pub const COUNTER_ROLL_SIDES: u32 = 10;
pub const COUNTER_THRESHOLD: u32 = 5;
pub const COUNTER_DAMAGE_SIDES: u32 = 10;

// Dodge
pub const DODGE_ROLL_SIDES: u32 = 20;
pub const DODGE_THRESHOLD: u32 = 12;
pub const DODGE_FAIL_DAMAGE_SIDES: u32 = 15;

// Heal
pub const HEAL_SIDES: u32 = 10;
pub const HEAL_BONUS: u32 = 10;
pub const HEAL_PUNISH_SIDES: u32 = 8;

// Special
pub const SPECIAL_ROLL_SIDES: u32 = 20;
pub const SPECIAL_HIT_THRESHOLD: u32 = 8;
pub const SPECIAL_STRONG_SIDES: u32 = 25;
pub const SPECIAL_STRONG_BONUS: u32 = 10;
pub const SPECIAL_WEAK_SIDES: u32 = 15;
pub const SPECIAL_RETALIATION_SIDES: u32 = 5;
pub const SPECIAL_COOLDOWN_PUNISH_SIDES: u32 = 12;
