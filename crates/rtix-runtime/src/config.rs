//! Runtime configuration.

/// Limits applied by [`Runtime::drain`](crate::Runtime::drain).
#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    /// Microtasks run per drain before yielding back to the host
    /// (default: 10,000).
    pub(crate) max_tasks_per_drain: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_drain: 10_000,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the drain batch limit. A drain that hits the limit with work left
    /// asks the host for another drain.
    pub fn max_tasks_per_drain(mut self, limit: usize) -> Self {
        self.max_tasks_per_drain = limit.max(1);
        self
    }

    pub fn get_max_tasks_per_drain(&self) -> usize {
        self.max_tasks_per_drain
    }
}
