//! Task queue
//!
//! The document's cooperative timeline: one FIFO drained strictly in order.
//! A task queued while another runs is appended and runs after everything
//! already queued.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::Document;

/// Deferred callback run against the document
pub type Task = Box<dyn FnOnce(&mut Document)>;

#[derive(Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
    draining: bool,
    completed: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    pub(crate) fn pop(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Is a drain loop currently running a task?
    pub fn is_draining(&self) -> bool {
        self.draining
    }

    /// Tasks run to completion so far
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Claim the drain loop. `false` if it is already running.
    pub(crate) fn begin_drain(&mut self) -> bool {
        !std::mem::replace(&mut self.draining, true)
    }

    pub(crate) fn end_drain(&mut self) {
        self.draining = false;
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed += 1;
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.tasks.len())
            .field("draining", &self.draining)
            .field("completed", &self.completed)
            .finish()
    }
}

impl Document {
    /// Append `action` to the task queue
    pub fn queue_task<F>(&mut self, action: F)
    where
        F: FnOnce(&mut Document) + 'static,
    {
        self.tasks.push(Box::new(action));
    }

    /// Run queued tasks one after another until the queue is empty.
    ///
    /// Called from inside a running task this returns immediately; the
    /// outer loop picks up whatever was queued.
    pub fn run_tasks(&mut self) {
        if !self.tasks.begin_drain() {
            return;
        }
        while let Some(task) = self.tasks.pop() {
            // A panicking task must not leave the queue stuck in draining
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| task(self))) {
                self.tasks.end_drain();
                panic::resume_unwind(payload);
            }
            self.tasks.mark_completed();
        }
        self.tasks.end_drain();
        tracing::trace!(completed = self.tasks.completed(), "task queue drained");
    }

    /// Number of tasks waiting to run
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }
}
