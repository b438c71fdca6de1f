//! Typewriter reveal of narration text
//!
//! Text appears one character per interval of virtual time. Replacing the
//! text restarts the reveal from empty and drops any progress on the old one.

use crate::core::clock::Millis;

/// Reveal milestones, stamped with the virtual time they happened at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealEvent {
    /// First character shown
    Started { at: Millis },
    /// Last character shown
    Completed { at: Millis },
}

/// Character-by-character reveal of one string
#[derive(Debug, Clone)]
pub struct Typewriter {
    interval: Millis,
    text: String,
    total_chars: usize,
    revealed: usize,
    started_at: Millis,
    active: bool,
    started: bool,
    completed: bool,
}

impl Typewriter {
    /// `interval` is the time per character; zero is treated as one
    pub fn new(interval: Millis) -> Self {
        Self {
            interval: interval.max(1),
            text: String::new(),
            total_chars: 0,
            revealed: 0,
            started_at: 0,
            active: false,
            started: false,
            completed: false,
        }
    }

    pub fn interval(&self) -> Millis {
        self.interval
    }

    /// Begin revealing `text` from the start, cancelling any reveal in flight
    pub fn start(&mut self, text: impl Into<String>, now: Millis) {
        self.text = text.into();
        self.total_chars = self.text.chars().count();
        self.revealed = 0;
        self.started_at = now;
        self.active = true;
        self.started = false;
        self.completed = false;
    }

    /// Stop revealing and clear the text
    pub fn clear(&mut self) {
        self.text.clear();
        self.total_chars = 0;
        self.revealed = 0;
        self.active = false;
        self.started = false;
        self.completed = false;
    }

    /// Reveal everything due by `now`
    pub fn advance_to(&mut self, now: Millis) -> Vec<RevealEvent> {
        let mut events = Vec::new();
        if !self.active || self.completed {
            return events;
        }

        let ticks = (now.saturating_sub(self.started_at) / self.interval) as usize;
        if ticks == 0 {
            return events;
        }

        if !self.started {
            self.started = true;
            events.push(RevealEvent::Started {
                at: self.started_at + self.interval,
            });
        }

        self.revealed = ticks.min(self.total_chars);
        if ticks >= self.total_chars.max(1) {
            self.completed = true;
            events.push(RevealEvent::Completed {
                at: self.completion_at(),
            });
        }
        events
    }

    fn completion_at(&self) -> Millis {
        self.started_at + self.total_chars.max(1) as Millis * self.interval
    }

    /// When the next reveal milestone will happen, if one is pending
    pub fn next_event_at(&self) -> Option<Millis> {
        if !self.active || self.completed {
            None
        } else if !self.started {
            Some(self.started_at + self.interval)
        } else {
            Some(self.completion_at())
        }
    }

    /// Input stays locked from `start` until the last character is shown
    pub fn is_writing(&self) -> bool {
        self.active && !self.completed
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Full text being revealed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The part of the text shown so far
    pub fn visible(&self) -> &str {
        match self.text.char_indices().nth(self.revealed) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }

    pub fn revealed_chars(&self) -> usize {
        self.revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveals_one_char_per_interval() {
        let mut tw = Typewriter::new(20);
        tw.start("Hello", 0);
        assert!(tw.is_writing());
        assert_eq!(tw.visible(), "");

        assert_eq!(tw.advance_to(20), vec![RevealEvent::Started { at: 20 }]);
        assert_eq!(tw.visible(), "H");

        assert!(tw.advance_to(79).is_empty());
        assert_eq!(tw.visible(), "Hel");

        assert_eq!(tw.advance_to(100), vec![RevealEvent::Completed { at: 100 }]);
        assert_eq!(tw.visible(), "Hello");
        assert!(!tw.is_writing());
        assert!(tw.advance_to(500).is_empty());
    }

    #[test]
    fn test_large_jump_fires_both_events() {
        let mut tw = Typewriter::new(10);
        tw.start("abc", 5);
        assert_eq!(
            tw.advance_to(1000),
            vec![RevealEvent::Started { at: 15 }, RevealEvent::Completed { at: 35 }]
        );
    }

    #[test]
    fn test_restart_resets_progress() {
        let mut tw = Typewriter::new(10);
        tw.start("first text", 0);
        tw.advance_to(50);
        assert_eq!(tw.visible(), "first");

        tw.start("second", 50);
        assert_eq!(tw.visible(), "");
        assert!(tw.is_writing());
        assert_eq!(tw.next_event_at(), Some(60));
        assert_eq!(tw.advance_to(60), vec![RevealEvent::Started { at: 60 }]);
        assert_eq!(tw.visible(), "s");
    }

    #[test]
    fn test_multibyte_text_reveals_by_char() {
        let mut tw = Typewriter::new(1);
        tw.start("añb", 0);
        tw.advance_to(2);
        assert_eq!(tw.visible(), "añ");
    }

    #[test]
    fn test_empty_text_completes_on_first_tick() {
        let mut tw = Typewriter::new(20);
        tw.start("", 0);
        assert!(tw.is_writing());
        assert_eq!(
            tw.advance_to(20),
            vec![RevealEvent::Started { at: 20 }, RevealEvent::Completed { at: 20 }]
        );
        assert!(!tw.is_writing());
    }

    #[test]
    fn test_clear_stops_reveal() {
        let mut tw = Typewriter::new(20);
        tw.start("text", 0);
        tw.clear();
        assert!(!tw.is_writing());
        assert!(tw.advance_to(1000).is_empty());
        assert_eq!(tw.next_event_at(), None);
    }
}
