//! Cooperative main-turn queue.
//!
//! Work that must wait for the current turn to finish (a page transition
//! committing) or for a fixed delay (re-layout after a resize) is posted here
//! as plain data. The owner drains due tasks once per loop turn. Because the
//! queue is owned by the screen, dropping or tearing down the screen drops
//! every pending task with it.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Handle for cancelling a posted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Delayed<T> {
    id: TaskId,
    due: Instant,
    task: T,
}

/// FIFO of next-turn tasks plus a set of deadline tasks.
#[derive(Debug)]
pub struct MainQueue<T> {
    next_id: u64,
    ready: VecDeque<(TaskId, T)>,
    delayed: Vec<Delayed<T>>,
}

impl<T> Default for MainQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MainQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            ready: VecDeque::new(),
            delayed: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> TaskId {
        self.next_id = self.next_id.wrapping_add(1);
        TaskId(self.next_id)
    }

    /// Run `task` on the next turn.
    pub fn post(&mut self, task: T) -> TaskId {
        let id = self.allocate_id();
        self.ready.push_back((id, task));
        id
    }

    /// Run `task` on the first turn at or after `now + delay`.
    pub fn post_after(&mut self, now: Instant, delay: Duration, task: T) -> TaskId {
        let id = self.allocate_id();
        self.delayed.push(Delayed {
            id,
            due: now + delay,
            task,
        });
        id
    }

    /// Cancel a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(pos) = self.ready.iter().position(|(tid, _)| *tid == id) {
            self.ready.remove(pos);
            return true;
        }
        if let Some(pos) = self.delayed.iter().position(|d| d.id == id) {
            self.delayed.remove(pos);
            return true;
        }
        false
    }

    pub fn cancel_all(&mut self) {
        let dropped = self.len();
        self.ready.clear();
        self.delayed.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "Cancelled pending main-queue tasks");
        }
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.ready.iter().any(|(tid, _)| *tid == id) || self.delayed.iter().any(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.ready.len() + self.delayed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty() && self.delayed.is_empty()
    }

    /// Earliest deadline among delayed tasks.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.delayed.iter().map(|d| d.due).min()
    }

    /// Remove and return every task due at `now`: next-turn tasks in posting
    /// order, then expired delayed tasks by deadline. Tasks posted while the
    /// returned batch runs wait for the following turn.
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        let mut due: Vec<T> = self.ready.drain(..).map(|(_, task)| task).collect();

        let mut expired: Vec<Delayed<T>> = Vec::new();
        let mut i = 0;
        while i < self.delayed.len() {
            if self.delayed[i].due <= now {
                expired.push(self.delayed.swap_remove(i));
            } else {
                i += 1;
            }
        }
        expired.sort_by_key(|d| (d.due, d.id.0));
        due.extend(expired.into_iter().map(|d| d.task));
        due
    }
}

// ============================================================================
// Tests
// ============================================================================
