//! Player actions available in a boss battle

use crate::core::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of moves a player can make each turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Strike the boss; the boss may counter
    Attack,
    /// Try to avoid the boss's blow entirely
    Dodge,
    /// Recover health while the boss attacks
    Heal,
    /// Heavy strike with a cooldown
    Special,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Attack, Action::Dodge, Action::Heal, Action::Special];

    /// Button label shown to the player
    pub fn label(&self) -> &'static str {
        match self {
            Action::Attack => "Attack",
            Action::Dodge => "Dodge",
            Action::Heal => "Heal",
            Action::Special => "Special Attack",
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Action::Special)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Action {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" | "a" => Ok(Action::Attack),
            "dodge" | "d" => Ok(Action::Dodge),
            "heal" | "h" => Ok(Action::Heal),
            "special" | "special attack" | "s" => Ok(Action::Special),
            other => Err(GameError::InvalidAction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_and_shortcuts() {
        assert_eq!("Attack".parse::<Action>().unwrap(), Action::Attack);
        assert_eq!(" d ".parse::<Action>().unwrap(), Action::Dodge);
        assert_eq!("HEAL".parse::<Action>().unwrap(), Action::Heal);
        assert_eq!("Special Attack".parse::<Action>().unwrap(), Action::Special);
        assert_eq!("s".parse::<Action>().unwrap(), Action::Special);
    }

    #[test]
    fn test_parse_unknown_is_invalid_action() {
        let err = "flee".parse::<Action>().unwrap_err();
        assert!(matches!(err, GameError::InvalidAction(name) if name == "flee"));
    }

    #[test]
    fn test_only_special_is_special() {
        let specials: Vec<_> = Action::ALL.iter().filter(|a| a.is_special()).collect();
        assert_eq!(specials, vec![&Action::Special]);
    }
}
