//! The runtime context handed to every scheduled callback.

use std::cell::{RefCell, RefMut};

use rtix_types::{InterfaceRule, InternalError, RuleEntry, TypeId, Universe, names};

use crate::config::RuntimeConfig;
use crate::error::AsyncError;
use crate::scheduler::{HostScheduler, Microtask, MicrotaskQueue, Task};
use crate::zone::Zone;

/// Class name of engine futures. It implements `Future<T>` through a type rule
/// registered when the runtime is created.
pub(crate) const FUTURE_CLASS: &str = "_Future";

/// Single-threaded runtime state: type universe, microtask queue, current
/// zone and the uncaught errors that reached the root zone.
pub struct Runtime {
    config: RuntimeConfig,
    universe: RefCell<Universe>,
    queue: RefCell<MicrotaskQueue>,
    host: Box<dyn HostScheduler>,
    root: Zone,
    current: RefCell<Zone>,
    uncaught: RefCell<Vec<AsyncError>>,
}

impl Runtime {
    pub fn new(host: impl HostScheduler + 'static) -> Self {
        Self::with_config(RuntimeConfig::default(), Universe::new(), host)
    }

    pub fn with_config(
        config: RuntimeConfig,
        mut universe: Universe,
        host: impl HostScheduler + 'static,
    ) -> Self {
        universe.add_rule(
            FUTURE_CLASS,
            RuleEntry::Interface(
                InterfaceRule::default()
                    .supertype(names::FUTURE, &["1"])
                    .type_variable("Future.T", "1"),
            ),
        );
        let root = Zone::root();
        Self {
            config,
            universe: RefCell::new(universe),
            queue: RefCell::new(MicrotaskQueue::default()),
            host: Box::new(host),
            current: RefCell::new(root.clone()),
            root,
            uncaught: RefCell::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Mutable access to the type universe. Do not hold the guard across
    /// calls back into the runtime.
    pub fn universe(&self) -> RefMut<'_, Universe> {
        self.universe.borrow_mut()
    }

    /// Parses a recipe with the runtime's universe.
    pub fn ty(&self, recipe: &str) -> Result<TypeId, InternalError> {
        self.universe().parse(recipe)
    }

    pub fn root_zone(&self) -> &Zone {
        &self.root
    }

    pub fn current_zone(&self) -> Zone {
        self.current.borrow().clone()
    }

    pub(crate) fn swap_zone(&self, zone: Zone) -> Zone {
        self.current.replace(zone)
    }

    /// Queues `callback` to run in the current zone after the current
    /// synchronous execution.
    pub fn schedule_microtask(
        &self,
        callback: impl FnOnce(&Runtime) -> Result<(), AsyncError> + 'static,
    ) {
        self.schedule_in(self.current_zone(), Box::new(callback));
    }

    pub(crate) fn schedule_in(&self, zone: Zone, callback: Microtask) {
        tracing::trace!(zone = zone.name(), "scheduled microtask");
        let idle = {
            let mut queue = self.queue.borrow_mut();
            let idle = queue.is_empty() && !queue.draining;
            queue.push(Task { zone, callback });
            idle
        };
        if idle {
            self.host.request_drain();
        }
    }

    pub(crate) fn schedule_priority(&self, zone: Zone, callback: Microtask) {
        tracing::trace!(zone = zone.name(), "scheduled priority microtask");
        let idle = {
            let mut queue = self.queue.borrow_mut();
            let idle = queue.is_empty() && !queue.draining;
            queue.push_priority(Task { zone, callback });
            idle
        };
        if idle {
            self.host.request_drain();
        }
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Runs queued microtasks, including ones scheduled while draining, until
    /// the queue is empty or the batch limit is reached. Returns the number of
    /// tasks run. A nested call while a drain is running does nothing.
    pub fn drain(&self) -> usize {
        if !self.begin_drain() {
            return 0;
        }
        let _guard = DrainGuard { rt: self };

        let limit = self.config.max_tasks_per_drain;
        let mut ran = 0;
        while ran < limit {
            let Some(task) = self.queue.borrow_mut().pop() else {
                break;
            };
            ran += 1;
            let Task { zone, callback } = task;
            if let Err(error) = zone.run(self, callback) {
                tracing::warn!(zone = zone.name(), %error, "microtask failed");
                zone.handle_uncaught(self, error);
            }
        }

        tracing::trace!(ran, remaining = self.pending_tasks(), "drained microtasks");
        ran
    }

    /// Drains until the queue stays empty, ignoring the batch limit.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.drain();
            total += ran;
            if ran == 0 || self.pending_tasks() == 0 {
                return total;
            }
        }
    }

    fn begin_drain(&self) -> bool {
        let mut queue = self.queue.borrow_mut();
        if queue.draining {
            return false;
        }
        queue.draining = true;
        true
    }

    pub(crate) fn record_uncaught(&self, error: AsyncError) {
        self.uncaught.borrow_mut().push(error);
    }

    /// Errors that reached the root zone unhandled, oldest first.
    pub fn take_uncaught_errors(&self) -> Vec<AsyncError> {
        std::mem::take(&mut *self.uncaught.borrow_mut())
    }
}

struct DrainGuard<'rt> {
    rt: &'rt Runtime,
}

/// Ends the drain, also when a task panics. Work left behind (batch limit or
/// unwind) gets a new host request, since `schedule_in` only asks on the
/// empty to non-empty transition.
impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        let remaining = {
            let mut queue = self.rt.queue.borrow_mut();
            queue.draining = false;
            queue.len()
        };
        if remaining > 0 {
            self.rt.host.request_drain();
        }
    }
}
