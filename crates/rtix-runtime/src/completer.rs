//! Completers: the producer side of a future.

use rtix_types::{TypeId, Value};

use crate::error::{AsyncError, CompleteError};
use crate::future::{Future, FutureState};
use crate::runtime::Runtime;

/// Completes its future at most once.
///
/// An asynchronous completer (the default) validates the value immediately and
/// applies it in a microtask; a synchronous one applies it on the spot.
pub struct Completer {
    future: Future,
    sync: bool,
}

impl Completer {
    pub fn new(rt: &Runtime, element: TypeId) -> Self {
        Self {
            future: Future::pending(rt, element),
            sync: false,
        }
    }

    pub fn sync(rt: &Runtime, element: TypeId) -> Self {
        Self {
            future: Future::pending(rt, element),
            sync: true,
        }
    }

    pub fn future(&self) -> &Future {
        &self.future
    }

    pub fn is_completed(&self) -> bool {
        self.future.state() != FutureState::Pending
    }

    /// Fails with [`CompleteError::Type`] when `value` is not a `FutureOr<T>`
    /// and with [`CompleteError::AlreadyCompleted`] on a second call.
    pub fn complete(&self, rt: &Runtime, value: Value) -> Result<(), CompleteError> {
        if self.sync {
            self.future.complete_sync(rt, value)
        } else {
            self.future.complete_async(rt, value)
        }
    }

    pub fn complete_error(&self, rt: &Runtime, error: AsyncError) -> Result<(), CompleteError> {
        if self.sync {
            self.future.complete_error_sync(rt, error)
        } else {
            self.future.complete_error_async(rt, error)
        }
    }
}
