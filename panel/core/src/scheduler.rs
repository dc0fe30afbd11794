//! Cooperative Scheduler
//!
//! Everything time-based in the panel (typewriter ticks, the reconnect
//! timer) is a task placed on a [`Scheduler`] instead of a sleeping future.
//! The concrete scheduler is a [`TimerQueue`]: a deadline-ordered queue whose
//! clock only moves when its owner advances it. The terminal run loop
//! advances it from a monotonic [`std::time::Instant`]; tests advance it by
//! hand, which makes every timing property deterministic.
//!
//! Times are expressed as a [`Duration`] since an arbitrary epoch chosen by
//! the owner (usually "process start").

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled task, used to cancel it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle {
    deadline: Duration,
    seq: u64,
}

impl TimerHandle {
    /// When the task is due
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// Schedules a task to run after a delay
pub trait Scheduler {
    /// Task payload handed back when the delay elapses
    type Task;

    /// Schedule `task` to become due `delay` after the current time
    fn schedule(&mut self, delay: Duration, task: Self::Task) -> TimerHandle;

    /// Cancel a scheduled task. Returns false if it already ran or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;
}

/// Deadline-ordered timer queue with an externally driven clock
///
/// Tasks with equal deadlines become due in the order they were scheduled.
#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    next_seq: u64,
    entries: BTreeMap<TimerHandle, T>,
}

impl<T> TimerQueue<T> {
    /// Create an empty queue at time zero
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            entries: BTreeMap::new(),
        }
    }

    /// Current time of the queue's clock
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Deadline of the earliest pending task
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.keys().next().map(TimerHandle::deadline)
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tasks are pending
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pop the earliest task due at or before `until`
    ///
    /// The clock moves to the popped task's deadline, so a task scheduled
    /// while handling it is timed from when it was due rather than from
    /// `until`. Once nothing else is due the clock settles at `until`.
    /// The clock never moves backwards.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        let due = self
            .next_deadline()
            .is_some_and(|deadline| deadline <= until);

        if !due {
            self.now = self.now.max(until);
            return None;
        }

        let (handle, task) = self.entries.pop_first()?;
        self.now = self.now.max(handle.deadline);
        Some(task)
    }

    /// Advance the clock to `until`, returning every task that became due
    ///
    /// Tasks scheduled by the caller while processing the returned batch are
    /// not included; use [`TimerQueue::pop_due`] in a loop for that.
    pub fn advance_to(&mut self, until: Duration) -> Vec<T> {
        let mut due = Vec::new();
        while let Some(task) = self.pop_due(until) {
            due.push(task);
        }
        due
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler for TimerQueue<T> {
    type Task = T;

    fn schedule(&mut self, delay: Duration, task: T) -> TimerHandle {
        let handle = TimerHandle {
            deadline: self.now + delay,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.entries.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }
}
