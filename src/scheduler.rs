//! One-shot timers on a logical millisecond clock.
//!
//! Each `schedule` call hands back a `TimerToken`; the owner keeps the
//! scheduler and can cancel one timer or all of them. Nothing here runs a
//! callback by itself: the owner pops due payloads and runs them, one at a
//! time, so every timer body executes to completion before the next.

use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken {
    due_ms: u64,
    seq: u64,
}

impl TimerToken {
    pub fn due_ms(&self) -> u64 {
        self.due_ms
    }
}

#[derive(Debug)]
pub struct Scheduler<T> {
    pending: BTreeMap<TimerToken, T>,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Queue `payload` to fire at `now_ms + delay_ms`.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, payload: T) -> TimerToken {
        let token = TimerToken {
            due_ms: now_ms.saturating_add(delay_ms),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.insert(token, payload);
        token
    }

    /// Returns the payload if the timer had not fired yet.
    pub fn cancel(&mut self, token: TimerToken) -> Option<T> {
        self.pending.remove(&token)
    }

    /// Drops every pending timer and reports how many there were.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    /// Earliest timer due at or before `now_ms`. Ties resolve in scheduling order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerToken, T)> {
        let token = *self.pending.keys().next()?;
        if token.due_ms > now_ms {
            return None;
        }
        self.pending.remove(&token).map(|payload| (token, payload))
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.keys().next().map(|t| t.due_ms)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
