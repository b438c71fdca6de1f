//! Cooperative phase scheduler
//!
//! A queue of `{delay, event}` steps over virtual time. Nothing fires on its
//! own: the owner advances the scheduler and handles whatever came due, in
//! due order. Events due at the same instant fire in the order they were
//! scheduled.

use crate::core::clock::{Clock, Millis};

/// Handle for cancelling a single scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<E> {
    id: TimerId,
    due: Millis,
    event: E,
}

/// Timed event queue driven by a virtual clock
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    clock: Clock,
    next_id: u64,
    /// Sorted by (due, id)
    timers: Vec<Timer<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            clock: Clock::new(),
            next_id: 0,
            timers: Vec::new(),
        }
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    /// Fire `event` after `delay` from now
    pub fn schedule(&mut self, delay: Millis, event: E) -> TimerId {
        let due = self.now().saturating_add(delay);
        self.schedule_at(due, event)
    }

    /// Fire `event` at an absolute time; past times fire on the next advance
    pub fn schedule_at(&mut self, due: Millis, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let index = self.timers.partition_point(|t| (t.due, t.id) <= (due, id));
        self.timers.insert(index, Timer { id, due, event });
        id
    }

    /// Queue steps that run one after another
    ///
    /// Each step's delay counts from the previous step, so
    /// `[(2500, banner), (0, outcome)]` shows the outcome 2.5s from now.
    pub fn chain(&mut self, steps: impl IntoIterator<Item = (Millis, E)>) -> Vec<TimerId> {
        let mut due = self.now();
        steps
            .into_iter()
            .map(|(delay, event)| {
                due = due.saturating_add(delay);
                self.schedule_at(due, event)
            })
            .collect()
    }

    /// Drop one pending event
    pub fn cancel(&mut self, id: TimerId) -> Option<E> {
        let index = self.timers.iter().position(|t| t.id == id)?;
        Some(self.timers.remove(index).event)
    }

    /// Drop every pending event
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Move time forward by `dt` and return everything that came due
    pub fn advance(&mut self, dt: Millis) -> Vec<E> {
        let target = self.now().saturating_add(dt);
        self.advance_to(target)
    }

    /// Move time forward to `target` and return everything that came due
    ///
    /// Time never runs backwards; an earlier target only flushes overdue events.
    pub fn advance_to(&mut self, target: Millis) -> Vec<E> {
        if target > self.now() {
            self.clock.advance(target - self.now());
        }
        let now = self.now();
        let due = self.timers.partition_point(|t| t.due <= now);
        self.timers.drain(..due).map(|t| t.event).collect()
    }

    /// When the earliest pending event is due
    pub fn next_due(&self) -> Option<Millis> {
        self.timers.first().map(|t| t.due)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_idle(&self) -> bool {
        self.timers.is_empty()
    }
}
