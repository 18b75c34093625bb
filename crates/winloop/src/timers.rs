//! Timeouts and intervals
//!
//! Deferred callbacks run by the scheduler at tick boundaries, after event
//! dispatch and drawing. A timer never fires more than once per tick; an
//! interval that fell behind is rescheduled from the current time instead of
//! catching up.

use std::time::{Duration, Instant};

use crate::error::CallbackResult;
use crate::foundation::collections::{SlotMap, TimerId};
use crate::platform::Platform;
use crate::runtime::Context;

/// Boxed timer callback
pub type TimerCallback<P> = Box<dyn FnMut(&mut Context<'_, P>) -> CallbackResult>;

struct TimerEntry<P: Platform> {
    deadline: Instant,
    period: Option<Duration>,
    seq: u64,
    // Taken out while the callback runs
    callback: Option<TimerCallback<P>>,
}

/// Scheduled timeouts and intervals
pub struct Timers<P: Platform> {
    entries: SlotMap<TimerId, TimerEntry<P>>,
    next_seq: u64,
}

impl<P: Platform> Default for Timers<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Platform> Timers<P> {
    /// Create an empty timer set
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            next_seq: 0,
        }
    }

    fn schedule(&mut self, deadline: Instant, period: Option<Duration>, callback: TimerCallback<P>) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(TimerEntry {
            deadline,
            period,
            seq,
            callback: Some(callback),
        })
    }

    /// Run `callback` once, `delay` after `now`
    pub fn set_timeout<F>(&mut self, now: Instant, delay: Duration, callback: F) -> TimerId
    where
        F: FnMut(&mut Context<'_, P>) -> CallbackResult + 'static,
    {
        self.schedule(now + delay, None, Box::new(callback))
    }

    /// Run `callback` every `period`, first at `now + period`
    pub fn set_interval<F>(&mut self, now: Instant, period: Duration, callback: F) -> TimerId
    where
        F: FnMut(&mut Context<'_, P>) -> CallbackResult + 'static,
    {
        self.schedule(now + period, Some(period), Box::new(callback))
    }

    /// Cancel a timer; returns `false` if it already fired or was cleared
    pub fn clear(&mut self, id: TimerId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Cancel every timer
    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// Number of scheduled timers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest deadline, used to bound blocking waits
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.values().map(|entry| entry.deadline).min()
    }

    /// Timers due at `now`, earliest first, ties in scheduling order
    pub(crate) fn due(&self, now: Instant) -> Vec<TimerId> {
        let mut due: Vec<(Instant, u64, TimerId)> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.deadline <= now && entry.callback.is_some())
            .map(|(id, entry)| (entry.deadline, entry.seq, id))
            .collect();
        due.sort_unstable_by_key(|(deadline, seq, _)| (*deadline, *seq));
        due.into_iter().map(|(_, _, id)| id).collect()
    }

    pub(crate) fn take(&mut self, id: TimerId) -> Option<TimerCallback<P>> {
        self.entries.get_mut(id).and_then(|entry| entry.callback.take())
    }

    /// Put a fired callback back (intervals) or drop the timer (timeouts)
    pub(crate) fn finish(&mut self, id: TimerId, callback: TimerCallback<P>, now: Instant) {
        let Some(entry) = self.entries.get_mut(id) else {
            // Cleared from inside its own callback
            return;
        };
        match entry.period {
            Some(period) => {
                entry.deadline += period;
                if entry.deadline <= now {
                    entry.deadline = now + period;
                }
                entry.callback = Some(callback);
            }
            None => {
                self.entries.remove(id);
            }
        }
    }
}
