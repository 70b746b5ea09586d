// src/animation/timeline.rs

//! A virtual clock with one-shot and repeating timers.
//!
//! Timers carry a plain task value instead of a callback; whoever advances
//! the clock receives the due tasks in deadline order and dispatches them.
//! Time only moves when [`Timeline::advance_to`] is called, so tests run the
//! whole animation cycle deterministically and instantly.

/// Opaque identifier for a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Internal representation of a scheduled timer.
#[derive(Debug)]
struct TimerEntry<T> {
    id: TimerId,
    task: T,
    /// Virtual time (ms) at which the timer fires.
    fire_at: u64,
    /// If `Some`, the timer repeats at this interval.
    interval: Option<u64>,
    /// Tie-breaker so timers with equal deadlines fire in scheduling order.
    seq: u64,
}

/// Virtual-time timer queue.
#[derive(Debug)]
pub struct Timeline<T> {
    now: u64,
    timers: Vec<TimerEntry<T>>,
    next_timer_id: u64,
    next_seq: u64,
}

impl<T: Clone> Timeline<T> {
    /// Creates an empty timeline at time zero.
    pub fn new() -> Self {
        Self {
            now: 0,
            timers: Vec::new(),
            next_timer_id: 1,
            next_seq: 0,
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedules `task` to fire once, `delay_ms` from now.
    pub fn schedule_after(&mut self, delay_ms: u64, task: T) -> TimerId {
        self.push(self.now + delay_ms, None, task)
    }

    /// Schedules `task` to fire every `interval_ms`, first one interval from now.
    ///
    /// A zero interval is bumped to 1ms so the timer cannot fire forever
    /// within one `advance_to`.
    pub fn schedule_every(&mut self, interval_ms: u64, task: T) -> TimerId {
        let interval_ms = interval_ms.max(1);
        self.push(self.now + interval_ms, Some(interval_ms), task)
    }

    fn push(&mut self, fire_at: u64, interval: Option<u64>, task: T) -> TimerId {
        let id = TimerId(self.next_timer_id);
        self.next_timer_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(TimerEntry {
            id,
            task,
            fire_at,
            interval,
            seq,
        });
        id
    }

    /// Cancels a timer. Unknown ids are ignored.
    pub fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }

    /// Cancels every pending timer at once.
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Number of pending timers.
    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// The earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.fire_at).min()
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Repeating timers are rescheduled.
    ///
    /// Callers dispatch one task at a time so a task may cancel or schedule
    /// timers before the next one is chosen.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, T)> {
        let position = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.fire_at <= until)
            .min_by_key(|(_, t)| (t.fire_at, t.seq))
            .map(|(i, _)| i)?;

        let fire_at = self.timers[position].fire_at;
        self.now = self.now.max(fire_at);

        let entry = &mut self.timers[position];
        let fired = (entry.id, entry.task.clone());
        match entry.interval {
            Some(interval) => {
                entry.fire_at += interval;
                entry.seq = self.next_seq;
                self.next_seq += 1;
            }
            None => {
                self.timers.swap_remove(position);
            }
        }
        Some(fired)
    }

    /// Moves the clock forward to `until` without firing anything.
    ///
    /// Call after draining [`pop_due`](Self::pop_due).
    pub fn settle_at(&mut self, until: u64) {
        self.now = self.now.max(until);
    }

    /// Fires everything due up to `until` and returns the tasks in order.
    ///
    /// Suitable when tasks do not reschedule each other; otherwise drive
    /// [`pop_due`](Self::pop_due) directly.
    pub fn advance_to(&mut self, until: u64) -> Vec<(TimerId, T)> {
        let mut fired = Vec::new();
        while let Some(entry) = self.pop_due(until) {
            fired.push(entry);
        }
        self.settle_at(until);
        fired
    }
}

impl<T: Clone> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}
