//! Deterministic fire-and-forget timers.
//!
//! The editor never sleeps or spawns threads: delayed work is queued here with a due
//! time and released when the host advances the clock. Actions due at the same
//! instant run in the order they were scheduled.

use std::time::Duration;

#[derive(Debug)]
struct Pending<A> {
    due: Duration,
    seq: u64,
    action: A,
}

#[derive(Debug)]
pub struct DeferredQueue<A> {
    now: Duration,
    next_seq: u64,
    pending: Vec<Pending<A>>,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: Vec::new(),
        }
    }
}

impl<A> DeferredQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, delay: Duration, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            due: self.now + delay,
            seq,
            action,
        });
    }

    /// Moves the clock forward and drains every action that became due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<A> {
        self.now += elapsed;
        let now = self.now;

        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|pending| pending.due <= now);
        self.pending = rest;

        due.sort_by_key(|pending| (pending.due, pending.seq));
        due.into_iter().map(|pending| pending.action).collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::DeferredQueue;
    use std::time::Duration;

    #[test]
    fn releases_actions_in_due_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(Duration::from_millis(400), "flash");
        queue.schedule(Duration::from_millis(150), "hide");
        queue.schedule(Duration::from_millis(150), "hide-again");

        assert!(queue.advance(Duration::from_millis(100)).is_empty());
        assert_eq!(queue.advance(Duration::from_millis(50)), vec!["hide", "hide-again"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.advance(Duration::from_secs(1)), vec!["flash"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn delays_are_relative_to_current_clock() {
        let mut queue = DeferredQueue::new();
        queue.advance(Duration::from_millis(500));
        queue.schedule(Duration::from_millis(10), 1);
        assert!(queue.advance(Duration::from_millis(9)).is_empty());
        assert_eq!(queue.advance(Duration::from_millis(1)), vec![1]);
        assert_eq!(queue.now(), Duration::from_millis(510));
    }

    #[test]
    fn clear_drops_everything() {
        let mut queue = DeferredQueue::new();
        queue.schedule(Duration::ZERO, ());
        queue.clear();
        assert!(queue.advance(Duration::from_secs(1)).is_empty());
    }
}
