//! Boss identities and their narrative tables
//!
//! A roster is immutable configuration. One `BossProfile` is picked when an
//! encounter starts and handed to the encounter, which only reads it.
//!
//! Text fields may contain `{name}`, replaced with the boss's name when the
//! profile is built.

use crate::combat::dice::Dice;
use crate::core::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default roster location, relative to the working directory
pub const DEFAULT_ROSTER_PATH: &str = "data/bosses.toml";

/// Everything an encounter needs to narrate one boss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossProfile {
    pub name: String,
    /// Key a presenter uses to pick artwork
    pub sprite_key: String,
    pub intro: String,
    pub victory: String,
    pub defeat: String,
    /// Scene-setting lines, one picked per turn
    pub ambience: Vec<String>,
    /// Announcements for the turn the boss enrages
    pub enrage_lines: Vec<String>,
}

impl BossProfile {
    /// Ambience line for a turn, cycling through the pool
    pub fn ambience_for(&self, turn: u32) -> &str {
        pick(&self.ambience, turn)
    }

    /// Enrage announcement for a turn, cycling through the pool
    pub fn enrage_line_for(&self, turn: u32) -> &str {
        pick(&self.enrage_lines, turn)
    }
}

fn pick(pool: &[String], turn: u32) -> &str {
    if pool.is_empty() {
        return "";
    }
    &pool[turn as usize % pool.len()]
}

/// One boss entry in the roster file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossEntry {
    pub name: String,
    pub sprite_key: String,
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub victory: Option<String>,
    #[serde(default)]
    pub defeat: Option<String>,
    #[serde(default)]
    pub enrage_lines: Option<Vec<String>>,
}

/// The set of bosses an encounter can draw from, plus shared narrative pools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossRoster {
    pub intro: String,
    pub victory: String,
    pub defeat: String,
    pub ambience: Vec<String>,
    pub enrage_lines: Vec<String>,
    #[serde(rename = "boss")]
    pub bosses: Vec<BossEntry>,
}

impl BossRoster {
    /// Parse a roster from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let roster: BossRoster = toml::from_str(contents)?;
        roster.validate()?;
        Ok(roster)
    }

    /// Load a roster file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            GameError::ConfigError(format!("Failed to read roster file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load the roster shipped in `data/`
    pub fn load_default() -> Result<Self> {
        Self::load(PathBuf::from(DEFAULT_ROSTER_PATH))
    }

    fn validate(&self) -> Result<()> {
        if self.bosses.is_empty() {
            return Err(GameError::ConfigError("Roster has no bosses".into()));
        }
        if let Some(entry) = self.bosses.iter().find(|b| b.name.trim().is_empty()) {
            return Err(GameError::ConfigError(format!(
                "Boss with sprite '{}' has no name",
                entry.sprite_key
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bosses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bosses.is_empty()
    }

    /// Build the profile for the boss at `index`
    pub fn profile(&self, index: usize) -> Option<BossProfile> {
        let entry = self.bosses.get(index)?;
        let fill = |text: &str| text.replace("{name}", &entry.name);

        Some(BossProfile {
            name: entry.name.clone(),
            sprite_key: entry.sprite_key.clone(),
            intro: fill(entry.intro.as_deref().unwrap_or(&self.intro)),
            victory: fill(entry.victory.as_deref().unwrap_or(&self.victory)),
            defeat: fill(entry.defeat.as_deref().unwrap_or(&self.defeat)),
            ambience: self.ambience.iter().map(|line| fill(line)).collect(),
            enrage_lines: entry
                .enrage_lines
                .as_ref()
                .unwrap_or(&self.enrage_lines)
                .iter()
                .map(|line| fill(line))
                .collect(),
        })
    }

    /// Pick a boss uniformly at random
    pub fn choose(&self, dice: &mut dyn Dice) -> Option<BossProfile> {
        if self.bosses.is_empty() {
            return None;
        }
        let index = dice.roll(self.bosses.len() as u32) as usize - 1;
        self.profile(index)
    }
}

impl Default for BossRoster {
    fn default() -> Self {
        let boss = |name: &str, sprite_key: &str| BossEntry {
            name: name.into(),
            sprite_key: sprite_key.into(),
            intro: None,
            victory: None,
            defeat: None,
            enrage_lines: None,
        };

        Self {
            intro: "{name} appears! You must fight to win. Your health: 100, Boss health: 150."
                .into(),
            victory: "You defeated {name}!".into(),
            defeat: "{name} was too strong.".into(),
            ambience: [
                "The boss roars menacingly as the battle begins.",
                "Shadows dance around the arena, heightening the tension.",
                "You feel the ground tremble under the boss's might.",
                "A fierce wind blows, carrying the scent of danger.",
                "The boss's eyes glow with otherworldly power.",
                "Echoes of past battles fill your mind.",
                "You steel yourself for the next exchange.",
                "The air crackles with energy.",
                "Victory seems within reach, but caution is key.",
                "The final clash approaches.",
                "A low growl echoes, promising pain.",
                "The boss's armor gleams under the eerie light.",
                "Dust and debris rise from the fractured ground.",
                "You spot a brief opening in the boss's defense.",
                "A moment of silence, the calm before the storm.",
                "The boss stumbles, showing a rare sign of weakness.",
                "Your heart pounds, a drumbeat for the fight.",
                "Arcane symbols on the floor begin to pulse with light.",
                "The scent of ozone fills the air as magic gathers.",
                "A glint of desperation appears in the boss's eyes.",
                "You parry a heavy blow, sending sparks flying.",
                "The beast prepares for a devastating charge.",
                "Memories of your training sharpen your focus.",
                "The arena itself seems to hold its breath.",
                "A sudden chill runs down your spine.",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            enrage_lines: vec![
                "{name} howls in fury! Its blows now strike twice as hard.".into(),
                "Wounded and furious, {name} sheds all restraint!".into(),
            ],
            bosses: vec![
                boss("The Penitent King, Valerius", "penitent_king"),
                boss("Grave-Limb, the Amalgamation", "grave_limb"),
                boss("The Sentinel of a Faded Star", "faded_sentinel"),
                boss("The Thrice-Blasphemed Pontiff", "pontiff"),
                boss("Matriarch of the Rusting Fen", "fen_matriarch"),
                boss("The Final, Lingering Echo", "lingering_echo"),
                boss("The Twin Heresiarchs, Ilsa and Orin", "twin_heresiarchs"),
                boss("The Eyeless Watcher", "eyeless_watcher"),
                boss("Cainhurst, the Gloom-Warden", "gloom_warden"),
                boss("The Aureate Lullaby", "aureate_lullaby"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::dice::ScriptedDice;

    #[test]
    fn test_default_roster_has_ten_bosses() {
        let roster = BossRoster::default();
        assert_eq!(roster.len(), 10);
        assert!(roster.validate().is_ok());
    }

    #[test]
    fn test_profile_fills_name() {
        let roster = BossRoster::default();
        let profile = roster.profile(7).unwrap();
        assert_eq!(profile.name, "The Eyeless Watcher");
        assert!(profile.intro.starts_with("The Eyeless Watcher appears!"));
        assert_eq!(profile.victory, "You defeated The Eyeless Watcher!");
        assert!(profile.enrage_lines.iter().all(|l| !l.contains("{name}")));
    }

    #[test]
    fn test_choose_uses_one_roll() {
        let roster = BossRoster::default();
        let mut dice = ScriptedDice::new([3]);
        let profile = roster.choose(&mut dice).unwrap();
        assert_eq!(profile.sprite_key, "faded_sentinel");
        assert_eq!(dice.consumed(), 1);
    }

    #[test]
    fn test_ambience_cycles_by_turn() {
        let profile = BossRoster::default().profile(0).unwrap();
        let len = profile.ambience.len() as u32;
        assert_eq!(profile.ambience_for(1), profile.ambience_for(1 + len));
        assert_eq!(profile.ambience_for(0), profile.ambience[0]);
    }

    #[test]
    fn test_empty_pool_yields_empty_line() {
        let mut profile = BossRoster::default().profile(0).unwrap();
        profile.enrage_lines.clear();
        assert_eq!(profile.enrage_line_for(4), "");
    }

    #[test]
    fn test_entry_overrides_shared_text() {
        let roster = BossRoster::from_toml_str(
            r#"
            intro = "{name} waits."
            victory = "won"
            defeat = "lost"
            ambience = ["Rain."]
            enrage_lines = ["Shared rage."]

            [[boss]]
            name = "Ashen Knight"
            sprite_key = "ashen"
            enrage_lines = ["{name} ignites!"]
            "#,
        )
        .unwrap();

        let profile = roster.profile(0).unwrap();
        assert_eq!(profile.intro, "Ashen Knight waits.");
        assert_eq!(profile.enrage_lines, vec!["Ashen Knight ignites!".to_string()]);
    }

    #[test]
    fn test_roster_without_bosses_rejected() {
        let result = BossRoster::from_toml_str(
            "intro = \"\"\nvictory = \"\"\ndefeat = \"\"\nambience = []\nenrage_lines = []\nboss = []\n",
        );
        assert!(matches!(result, Err(GameError::ConfigError(_))));
    }

    #[test]
    fn test_load_shipped_roster() {
        let roster = BossRoster::load_default().expect("Should load data/bosses.toml");
        assert_eq!(roster.len(), BossRoster::default().len());
    }
}
