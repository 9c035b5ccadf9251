//! Virtual-time timer queue. Time only moves when the session is told to advance it, which keeps
//! deferred work deterministic.

use std::time::Duration;

use crate::quiz::Ordinal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    RevealFeedback(Ordinal),
}

#[derive(Debug)]
struct ScheduledTask {
    due_at: Duration,
    order: u64,
    task: Task,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_order: u64,
    queue: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn schedule(&mut self, delay: Duration, task: Task) {
        let order = self.next_order;
        self.next_order += 1;
        self.queue.push(ScheduledTask {
            due_at: self.now + delay,
            order,
            task,
        });
    }

    /// Removes the earliest task due at or before `until` and moves the clock to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<Task> {
        let index = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_at <= until)
            .min_by_key(|(_, t)| (t.due_at, t.order))
            .map(|(i, _)| i)?;
        let scheduled = self.queue.swap_remove(index);
        self.now = self.now.max(scheduled.due_at);
        Some(scheduled.task)
    }

    /// Due time of the last queued task.
    pub fn horizon(&self) -> Option<Duration> {
        self.queue.iter().map(|t| t.due_at).max()
    }

    pub fn advance_to(&mut self, target: Duration) {
        self.now = self.now.max(target);
    }
}
