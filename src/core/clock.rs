//! Virtual time used by every timed transition
//!
//! Nothing in the core reads the wall clock. Presenters measure elapsed real
//! time and feed it in through `advance`, which keeps reveal and phase timing
//! reproducible in tests.

/// Milliseconds of virtual time
pub type Millis = u64;

/// Monotonic virtual clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    now: Millis,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Move time forward, returning the new current time
    pub fn advance(&mut self, dt: Millis) -> Millis {
        self.now = self.now.saturating_add(dt);
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        assert_eq!(Clock::new().now(), 0);
    }

    #[test]
    fn test_clock_advance_accumulates() {
        let mut clock = Clock::new();
        clock.advance(20);
        assert_eq!(clock.advance(1480), 1500);
        assert_eq!(clock.now(), 1500);
    }

    #[test]
    fn test_clock_saturates() {
        let mut clock = Clock::new();
        clock.advance(Millis::MAX);
        clock.advance(10);
        assert_eq!(clock.now(), Millis::MAX);
    }
}
