//! Suspension point of compiled async bodies.

use rtix_types::Value;

use crate::error::AsyncError;
use crate::future::Future;
use crate::runtime::Runtime;

/// Resumes the body with `value`'s result in a later microtask.
///
/// A non-future value is wrapped in a completed `Future<dynamic>` first, so
/// the body never resumes synchronously. The callbacks run in the zone that
/// is current now; an `Err` from either is reported to that zone.
pub fn await_on(
    rt: &Runtime,
    value: Value,
    on_value: impl FnOnce(&Runtime, Value) -> Result<(), AsyncError> + 'static,
    on_error: impl FnOnce(&Runtime, AsyncError) -> Result<(), AsyncError> + 'static,
) {
    let future = match Future::from_value(&value) {
        Some(future) => future,
        None => {
            let dynamic = rt.universe().dynamic();
            Future::completed(rt, dynamic, value)
        }
    };
    future.await_with(rt, Box::new(on_value), Box::new(on_error));
}
