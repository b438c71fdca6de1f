//! Lightsouls - Turn-Based Boss Battles with Narrated Outcomes

pub mod adventure;
pub mod combat;
pub mod core;
pub mod llm;
pub mod narration;
pub mod schedule;
pub mod session;
pub mod speech;
