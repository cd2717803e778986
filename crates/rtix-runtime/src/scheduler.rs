//! Microtask queue.
//!
//! Tasks run in FIFO order. Priority tasks go after the last queued priority
//! task but ahead of all normal work; they carry uncaught-error reports so a
//! report is never starved by a long chain of continuations.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::AsyncError;
use crate::runtime::Runtime;
use crate::zone::Zone;

/// A deferred callback. An `Err` is reported to the zone the task was
/// scheduled in; the drain continues.
pub type Microtask = Box<dyn FnOnce(&Runtime) -> Result<(), AsyncError>>;

/// The host's primitive for running code after the current synchronous
/// execution unwinds.
pub trait HostScheduler {
    /// Called when the queue needs a drain. The host must later call
    /// [`Runtime::drain`] from a fresh stack.
    fn request_drain(&self);
}

/// Host that only counts requests; the embedder drains by hand.
#[derive(Clone, Debug, Default)]
pub struct ManualHost {
    requests: Rc<Cell<usize>>,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of drain requests received so far.
    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

impl HostScheduler for ManualHost {
    fn request_drain(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

pub(crate) struct Task {
    pub(crate) zone: Zone,
    pub(crate) callback: Microtask,
}

#[derive(Default)]
pub(crate) struct MicrotaskQueue {
    tasks: VecDeque<Task>,
    /// Length of the priority prefix of `tasks`.
    priority: usize,
    pub(crate) draining: bool,
}

impl MicrotaskQueue {
    pub(crate) fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    pub(crate) fn push_priority(&mut self, task: Task) {
        self.tasks.insert(self.priority, task);
        self.priority += 1;
    }

    pub(crate) fn pop(&mut self) -> Option<Task> {
        let task = self.tasks.pop_front()?;
        self.priority = self.priority.saturating_sub(1);
        Some(task)
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
