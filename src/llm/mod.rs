//! LLM integration for the adventure mode
//!
//! The LLM writes story rounds only. Boss battles never consult it.

pub mod client;
pub mod story;

pub use client::{ApiFormat, LlmClient};
pub use story::{
    build_prompt, parse_round, LlmStoryGenerator, RoundChoice, RoundData, RoundHistory,
    StoryGenerator, MAX_ROUNDS,
};
