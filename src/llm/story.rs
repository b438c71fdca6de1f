//! Generate adventure rounds with the LLM
//!
//! Each request carries every past decision so the story stays consistent.
//! The LLM writes the story and decides which of the two choices survives;
//! the adventure flow only enforces the round limit and timing.

use crate::core::error::{GameError, Result};
use crate::llm::client::LlmClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Number of rounds in a full adventure
pub const MAX_ROUNDS: u32 = 10;

/// One of the two options offered in a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundChoice {
    pub text: String,
    /// Picking this choice leads to the next round
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
    /// Lore revealed after the choice is made
    pub reason: String,
}

/// A generated round: the story so far and two choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundData {
    pub story: String,
    pub choice1: RoundChoice,
    pub choice2: RoundChoice,
}

impl RoundData {
    pub fn choices(&self) -> [&RoundChoice; 2] {
        [&self.choice1, &self.choice2]
    }
}

/// A decision the player already made
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundHistory {
    pub choice: String,
    pub reason: String,
}

impl From<&RoundChoice> for RoundHistory {
    fn from(choice: &RoundChoice) -> Self {
        Self {
            choice: choice.text.clone(),
            reason: choice.reason.clone(),
        }
    }
}

/// Source of adventure rounds
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Generate round `round` (1-based) given every earlier decision
    async fn generate_round(&self, history: &[RoundHistory], round: u32) -> Result<RoundData>;
}

/// `StoryGenerator` backed by an `LlmClient`
pub struct LlmStoryGenerator {
    client: LlmClient,
}

impl LlmStoryGenerator {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(LlmClient::from_env()?))
    }
}

#[async_trait]
impl StoryGenerator for LlmStoryGenerator {
    async fn generate_round(&self, history: &[RoundHistory], round: u32) -> Result<RoundData> {
        if round == 0 {
            return Err(GameError::LlmError(
                "Invalid request: round numbers start at 1".into(),
            ));
        }

        tracing::debug!("Requesting round {} with {} past decisions", round, history.len());
        let response = self
            .client
            .complete(STORY_SYSTEM_PROMPT, &build_prompt(history, round))
            .await?;
        parse_round(&response)
    }
}

/// Parse a round out of a raw LLM reply
pub fn parse_round(response: &str) -> Result<RoundData> {
    let json_str = extract_json(response)?;
    serde_json::from_str(json_str).map_err(|e| {
        GameError::LlmError(format!(
            "Failed to parse round: {} - Response: {}",
            e, response
        ))
    })
}

/// Extract JSON object from LLM response (handles surrounding text)
fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| GameError::LlmError("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| GameError::LlmError("No closing brace found in response".into()))?;
    Ok(&response[start..=end])
}

/// User prompt for one round
pub fn build_prompt(history: &[RoundHistory], round: u32) -> String {
    let progress = if round == 1 {
        "Start by generating a BACKSTORY to introduce the setting. \
         Keep it mysterious, poetic, and less than 5 sentences."
            .to_string()
    } else if history.is_empty() {
        "Past decisions:\nNone yet.".to_string()
    } else {
        let context: Vec<String> = history
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                format!(
                    "Round {}:\n- Choice made: \"{}\"\n- Outcome: {}",
                    i + 1,
                    entry.choice,
                    entry.reason
                )
            })
            .collect();
        format!("Past decisions:\n{}", context.join("\n"))
    };

    format!(
        "The player is currently at Round {} of {}.\n\n{}\n\n{}",
        round, MAX_ROUNDS, progress, ROUND_FORMAT
    )
}

/// System prompt for round generation
const STORY_SYSTEM_PROMPT: &str = r#"You are a game designer creating a dark fantasy, Souls-like RPG text adventure called "Lightsouls". The game lasts exactly 10 rounds. Each round presents the player with:
- A short narrative story (2-3 sentences),
- Two choices, one of which leads to the next round and one which ends the game.

The world is cursed, bleak, and rich in cryptic lore.

Only ONE choice should be correct. Randomize which one is correct each time.
Provide a reason for both outcomes that expands the world or deepens the mystery."#;

const ROUND_FORMAT: &str = r#"Now return ONLY a JSON object in this format:

{
  "story": "string (short story for this round)",
  "choice1": {
    "text": "string",
    "isCorrect": boolean,
    "reason": "string"
  },
  "choice2": {
    "text": "string",
    "isCorrect": boolean,
    "reason": "string"
  }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"Here is your round:
```json
{
  "story": "Ash falls on the bell tower.",
  "choice1": {"text": "Ring the bell", "isCorrect": false, "reason": "The bell wakes the hollow."},
  "choice2": {"text": "Descend the stairs", "isCorrect": true, "reason": "The crypt is quiet."}
}
```"#;

    #[test]
    fn test_extract_json() {
        let input = "Here's the result: {\"key\": \"value\"} done";
        let result = extract_json(input).unwrap();
        assert_eq!(result, "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_no_json() {
        let input = "No JSON here";
        assert!(extract_json(input).is_err());
    }

    #[test]
    fn test_extract_json_reversed_braces() {
        assert!(extract_json("} nothing {").is_err());
    }

    #[test]
    fn test_parse_round_from_fenced_reply() {
        let round = parse_round(REPLY).unwrap();
        assert_eq!(round.story, "Ash falls on the bell tower.");
        assert!(!round.choice1.is_correct);
        assert!(round.choice2.is_correct);
        assert_eq!(round.choices()[1].text, "Descend the stairs");
    }

    #[test]
    fn test_parse_round_missing_field() {
        let err = parse_round(r#"{"story": "x"}"#).unwrap_err();
        assert!(matches!(err, GameError::LlmError(msg) if msg.contains("Failed to parse round")));
    }

    #[test]
    fn test_first_round_asks_for_backstory() {
        let prompt = build_prompt(&[], 1);
        assert!(prompt.contains("Round 1 of 10"));
        assert!(prompt.contains("BACKSTORY"));
        assert!(!prompt.contains("Past decisions"));
    }

    #[test]
    fn test_later_rounds_list_decisions() {
        let history = vec![
            RoundHistory {
                choice: "Light the torch".into(),
                reason: "The shadows recede.".into(),
            },
            RoundHistory {
                choice: "Cross the bridge".into(),
                reason: "It holds.".into(),
            },
        ];
        let prompt = build_prompt(&history, 3);
        assert!(prompt.contains("Round 3 of 10"));
        assert!(prompt.contains("Round 1:\n- Choice made: \"Light the torch\"\n- Outcome: The shadows recede."));
        assert!(prompt.contains("Round 2:\n- Choice made: \"Cross the bridge\""));
        assert!(!prompt.contains("BACKSTORY"));
    }

    #[test]
    fn test_later_round_without_history() {
        assert!(build_prompt(&[], 2).contains("Past decisions:\nNone yet."));
    }

    #[test]
    fn test_history_from_choice() {
        let choice = RoundChoice {
            text: "Kneel".into(),
            is_correct: true,
            reason: "The statue nods.".into(),
        };
        let entry = RoundHistory::from(&choice);
        assert_eq!(entry.choice, "Kneel");
        assert_eq!(entry.reason, "The statue nods.");
    }

    #[tokio::test]
    async fn test_round_zero_rejected_before_request() {
        // Unroutable URL: reaching the network would fail differently
        let client = LlmClient::new("key".into(), "http://127.0.0.1:9".into(), "model".into());
        let generator = LlmStoryGenerator::new(client);
        let err = generator.generate_round(&[], 0).await.unwrap_err();
        assert!(matches!(err, GameError::LlmError(msg) if msg.contains("Invalid request")));
    }
}
