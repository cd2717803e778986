#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Single-threaded asynchronous runtime.
//!
//! A [`Runtime`] owns the type [`Universe`](rtix_types::Universe), the
//! microtask queue and the current [`Zone`]. [`Future`]s are single-assignment
//! cells whose continuations always run in a later microtask; the host is told
//! when the queue needs draining through the [`HostScheduler`] port.

pub mod await_on;
pub mod completer;
pub mod config;
pub mod error;
pub mod future;
pub mod runtime;
pub mod scheduler;
pub mod zone;

#[cfg(test)]
mod await_on_tests;
#[cfg(test)]
mod future_tests;

pub use await_on::await_on;
pub use completer::Completer;
pub use config::RuntimeConfig;
pub use error::{AsyncError, CompleteError, StackTrace};
pub use future::{Future, FutureState};
pub use runtime::Runtime;
pub use scheduler::{HostScheduler, ManualHost, Microtask};
pub use zone::{UncaughtHandler, Zone, ZoneSpec};
