//! Futures.
//!
//! A future is a single-assignment cell. It starts pending, may be marked as
//! completing while an asynchronous completion waits in the queue, and ends
//! either terminal (value or error) or chained to another future whose result
//! it adopts. Continuations registered on a terminal future are scheduled, never
//! run inline, and propagation walks chains with an explicit work queue.
//!
//! A future is also a runtime [`Value`]: an object of class `_Future<T>`, which
//! implements `Future<T>`. Completing a future with such a value assimilates
//! it instead of storing it.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use rtix_types::{TypeId, Value};

use crate::error::{AsyncError, CompleteError};
use crate::runtime::{FUTURE_CLASS, Runtime};
use crate::zone::Zone;

type OnValue = Box<dyn FnOnce(&Runtime, Value) -> Result<Value, AsyncError>>;
type OnError = Box<dyn FnOnce(&Runtime, AsyncError) -> Result<Value, AsyncError>>;
type ErrorTest = Box<dyn FnOnce(&Runtime, &AsyncError) -> bool>;
type Action = Box<dyn FnOnce(&Runtime) -> Result<Value, AsyncError>>;
pub(crate) type AwaitValue = Box<dyn FnOnce(&Runtime, Value) -> Result<(), AsyncError>>;
pub(crate) type AwaitError = Box<dyn FnOnce(&Runtime, AsyncError) -> Result<(), AsyncError>>;

enum Handler {
    Then {
        on_value: OnValue,
        on_error: Option<OnError>,
    },
    CatchError {
        on_error: OnError,
        test: Option<ErrorTest>,
    },
    WhenComplete(Action),
    /// Resumes a suspended async body; has no result future.
    Await {
        on_value: AwaitValue,
        on_error: AwaitError,
    },
}

/// What a continuation produced.
enum Reaction {
    Value(Value),
    Error(AsyncError),
    /// A `when_complete` action returned a future: forward the original
    /// result once it completes.
    After(Future, Result<Value, AsyncError>),
    Done,
}

impl Handler {
    fn invoke(self, rt: &Runtime, result: Result<Value, AsyncError>) -> Reaction {
        match self {
            Handler::Then { on_value, on_error } => match result {
                Ok(value) => on_value(rt, value).into(),
                Err(error) => match on_error {
                    Some(on_error) => on_error(rt, error).into(),
                    None => Reaction::Error(error),
                },
            },
            Handler::CatchError { on_error, test } => match result {
                Ok(value) => Reaction::Value(value),
                Err(error) => {
                    if test.is_none_or(|test| test(rt, &error)) {
                        on_error(rt, error).into()
                    } else {
                        Reaction::Error(error)
                    }
                }
            },
            Handler::WhenComplete(action) => match action(rt) {
                Err(error) => Reaction::Error(error),
                Ok(value) => match Future::from_value(&value) {
                    Some(future) => Reaction::After(future, result),
                    None => result.into(),
                },
            },
            Handler::Await { on_value, on_error } => {
                let resumed = match result {
                    Ok(value) => on_value(rt, value),
                    Err(error) => on_error(rt, error),
                };
                match resumed {
                    Ok(()) => Reaction::Done,
                    Err(error) => Reaction::Error(error),
                }
            }
        }
    }
}

impl From<Result<Value, AsyncError>> for Reaction {
    fn from(result: Result<Value, AsyncError>) -> Self {
        match result {
            Ok(value) => Reaction::Value(value),
            Err(error) => Reaction::Error(error),
        }
    }
}

struct Listener {
    handler: Handler,
    result: Option<Future>,
    /// Zone current at registration; the handler runs inside it.
    zone: Zone,
}

enum State {
    Pending {
        listeners: Vec<Listener>,
        /// An asynchronous completion is queued.
        completing: bool,
    },
    Chained(Future),
    Value(Value),
    Error(AsyncError),
}

/// Observable state of a single future, without following chains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FutureState {
    Pending,
    PendingComplete,
    Chained,
    Value,
    Error,
}

enum Outcome {
    Value(Value),
    Error(AsyncError),
    Chain(Future),
}

type Work = VecDeque<(Future, Listener)>;

pub(crate) struct FutureCell {
    element: TypeId,
    zone: Zone,
    state: RefCell<State>,
    ignored: Cell<bool>,
}

/// Handle to a future cell. Clones share the cell.
#[derive(Clone)]
pub struct Future {
    cell: Rc<FutureCell>,
    /// The `_Future<T>` object wrapping `cell`.
    object: Value,
}

impl Future {
    pub(crate) fn pending(rt: &Runtime, element: TypeId) -> Future {
        let rti = rt.universe().interface(FUTURE_CLASS, vec![element]);
        let cell = Rc::new(FutureCell {
            element,
            zone: rt.current_zone(),
            state: RefCell::new(State::Pending {
                listeners: Vec::new(),
                completing: false,
            }),
            ignored: Cell::new(false),
        });
        let payload: Rc<dyn Any> = cell.clone();
        Future {
            object: Value::object_with(rti, payload),
            cell,
        }
    }

    /// A future of `element` that completes with `value` in a later
    /// microtask. `value` may itself be a future.
    pub fn value(rt: &Runtime, element: TypeId, value: Value) -> Result<Future, CompleteError> {
        let future = Future::pending(rt, element);
        future.complete_async(rt, value)?;
        Ok(future)
    }

    /// A future of `element` that fails with `error` in a later microtask.
    pub fn error(rt: &Runtime, element: TypeId, error: AsyncError) -> Future {
        let future = Future::pending(rt, element);
        future.mark_completing();
        future.schedule_settle(rt, Outcome::Error(error));
        future
    }

    /// Already holding `value`; the caller vouches for its type.
    pub(crate) fn completed(rt: &Runtime, element: TypeId, value: Value) -> Future {
        let future = Future::pending(rt, element);
        *future.cell.state.borrow_mut() = State::Value(value);
        future
    }

    /// The future behind an object value, if it is an engine future.
    pub fn from_value(value: &Value) -> Option<Future> {
        let Value::Object(object) = value else {
            return None;
        };
        let cell = object.payload.clone()?.downcast::<FutureCell>().ok()?;
        Some(Future {
            cell,
            object: value.clone(),
        })
    }

    pub fn to_value(&self) -> Value {
        self.object.clone()
    }

    /// The `T` of `Future<T>`.
    pub fn element(&self) -> TypeId {
        self.cell.element
    }

    pub fn zone(&self) -> &Zone {
        &self.cell.zone
    }

    pub fn ptr_eq(&self, other: &Future) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    pub fn state(&self) -> FutureState {
        match &*self.cell.state.borrow() {
            State::Pending {
                completing: false, ..
            } => FutureState::Pending,
            State::Pending {
                completing: true, ..
            } => FutureState::PendingComplete,
            State::Chained(_) => FutureState::Chained,
            State::Value(_) => FutureState::Value,
            State::Error(_) => FutureState::Error,
        }
    }

    /// The terminal result, following chains.
    pub fn result(&self) -> Option<Result<Value, AsyncError>> {
        self.resolve_chain().terminal()
    }

    pub fn is_complete(&self) -> bool {
        self.result().is_some()
    }

    /// Stops an error reaching this future without listeners from being
    /// reported as uncaught.
    pub fn ignore(&self) {
        self.cell.ignored.set(true);
    }

    pub fn then(
        &self,
        rt: &Runtime,
        element: TypeId,
        on_value: impl FnOnce(&Runtime, Value) -> Result<Value, AsyncError> + 'static,
    ) -> Future {
        self.listen(
            rt,
            element,
            Handler::Then {
                on_value: Box::new(on_value),
                on_error: None,
            },
        )
    }

    /// `then` with an error handler; its value completes the result future.
    pub fn then_or_else(
        &self,
        rt: &Runtime,
        element: TypeId,
        on_value: impl FnOnce(&Runtime, Value) -> Result<Value, AsyncError> + 'static,
        on_error: impl FnOnce(&Runtime, AsyncError) -> Result<Value, AsyncError> + 'static,
    ) -> Future {
        self.listen(
            rt,
            element,
            Handler::Then {
                on_value: Box::new(on_value),
                on_error: Some(Box::new(on_error)),
            },
        )
    }

    pub fn catch_error(
        &self,
        rt: &Runtime,
        on_error: impl FnOnce(&Runtime, AsyncError) -> Result<Value, AsyncError> + 'static,
    ) -> Future {
        self.listen(
            rt,
            self.element(),
            Handler::CatchError {
                on_error: Box::new(on_error),
                test: None,
            },
        )
    }

    /// Handles only errors accepted by `test`; others pass through.
    pub fn catch_error_where(
        &self,
        rt: &Runtime,
        on_error: impl FnOnce(&Runtime, AsyncError) -> Result<Value, AsyncError> + 'static,
        test: impl FnOnce(&Runtime, &AsyncError) -> bool + 'static,
    ) -> Future {
        self.listen(
            rt,
            self.element(),
            Handler::CatchError {
                on_error: Box::new(on_error),
                test: Some(Box::new(test)),
            },
        )
    }

    /// Runs `action` on either outcome. The result future repeats this
    /// future's result, after the future `action` returns (if any) completes.
    /// An error from `action` replaces the result.
    pub fn when_complete(
        &self,
        rt: &Runtime,
        action: impl FnOnce(&Runtime) -> Result<Value, AsyncError> + 'static,
    ) -> Future {
        self.listen(rt, self.element(), Handler::WhenComplete(Box::new(action)))
    }

    pub(crate) fn await_with(&self, rt: &Runtime, on_value: AwaitValue, on_error: AwaitError) {
        self.add_listener(
            rt,
            Listener {
                handler: Handler::Await { on_value, on_error },
                result: None,
                zone: rt.current_zone(),
            },
        );
    }

    fn listen(&self, rt: &Runtime, element: TypeId, handler: Handler) -> Future {
        let result = Future::pending(rt, element);
        self.add_listener(
            rt,
            Listener {
                handler,
                result: Some(result.clone()),
                zone: rt.current_zone(),
            },
        );
        result
    }

    fn add_listener(&self, rt: &Runtime, listener: Listener) {
        let source = self.resolve_chain();
        if let State::Pending { listeners, .. } = &mut *source.cell.state.borrow_mut() {
            listeners.push(listener);
            return;
        }
        let zone = source.cell.zone.clone();
        rt.schedule_in(
            zone,
            Box::new(move |rt| {
                propagate(rt, Work::from([(source, listener)]));
                Ok(())
            }),
        );
    }

    fn resolve_chain(&self) -> Future {
        let mut future = self.clone();
        loop {
            let next = match &*future.cell.state.borrow() {
                State::Chained(next) => Some(next.clone()),
                _ => None,
            };
            match next {
                Some(next) => future = next,
                None => return future,
            }
        }
    }

    fn terminal(&self) -> Option<Result<Value, AsyncError>> {
        match &*self.cell.state.borrow() {
            State::Value(value) => Some(Ok(value.clone())),
            State::Error(error) => Some(Err(error.clone())),
            _ => None,
        }
    }

    fn check_completable(&self) -> Result<(), CompleteError> {
        match &*self.cell.state.borrow() {
            State::Pending {
                completing: false, ..
            } => Ok(()),
            _ => Err(CompleteError::AlreadyCompleted),
        }
    }

    fn mark_completing(&self) {
        if let State::Pending { completing, .. } = &mut *self.cell.state.borrow_mut() {
            *completing = true;
        }
    }

    /// Checks `value` against `FutureOr<T>` now and applies it in a
    /// microtask.
    pub(crate) fn complete_async(&self, rt: &Runtime, value: Value) -> Result<(), CompleteError> {
        let value = self.admit(rt, value)?;
        self.mark_completing();
        let future = self.clone();
        rt.schedule_in(
            self.cell.zone.clone(),
            Box::new(move |rt| {
                let outcome = outcome_for(rt, future.element(), value);
                future.settle(rt, outcome);
                Ok(())
            }),
        );
        Ok(())
    }

    pub(crate) fn complete_sync(&self, rt: &Runtime, value: Value) -> Result<(), CompleteError> {
        let value = self.admit(rt, value)?;
        let outcome = outcome_for(rt, self.element(), value);
        self.settle(rt, outcome);
        Ok(())
    }

    pub(crate) fn complete_error_async(
        &self,
        rt: &Runtime,
        error: AsyncError,
    ) -> Result<(), CompleteError> {
        self.check_completable()?;
        self.mark_completing();
        self.schedule_settle(rt, Outcome::Error(error));
        Ok(())
    }

    pub(crate) fn complete_error_sync(
        &self,
        rt: &Runtime,
        error: AsyncError,
    ) -> Result<(), CompleteError> {
        self.check_completable()?;
        self.settle(rt, Outcome::Error(error));
        Ok(())
    }

    fn admit(&self, rt: &Runtime, value: Value) -> Result<Value, CompleteError> {
        self.check_completable()?;
        let expected = rt.universe().future_or(self.element());
        Ok(rt.universe().cast(value, expected)?)
    }

    fn schedule_settle(&self, rt: &Runtime, outcome: Outcome) {
        let future = self.clone();
        rt.schedule_in(
            self.cell.zone.clone(),
            Box::new(move |rt| {
                future.settle(rt, outcome);
                Ok(())
            }),
        );
    }

    fn settle(&self, rt: &Runtime, outcome: Outcome) {
        let mut work = Work::new();
        self.complete_now(rt, outcome, &mut work);
        propagate(rt, work);
    }

    /// Applies `outcome` and queues the listeners it releases.
    fn complete_now(&self, rt: &Runtime, outcome: Outcome, work: &mut Work) {
        let outcome = match outcome {
            Outcome::Chain(source) => {
                let source = source.resolve_chain();
                if source.ptr_eq(self) {
                    Outcome::Error(AsyncError::msg("a future cannot be completed with itself"))
                } else {
                    match source.terminal() {
                        Some(Ok(value)) => Outcome::Value(value),
                        Some(Err(error)) => Outcome::Error(error),
                        None => Outcome::Chain(source),
                    }
                }
            }
            outcome => outcome,
        };

        let Some(listeners) = self.take_listeners() else {
            tracing::debug!("ignored completion of a settled future");
            return;
        };
        match outcome {
            Outcome::Chain(source) => {
                *self.cell.state.borrow_mut() = State::Chained(source.clone());
                if let State::Pending {
                    listeners: pending, ..
                } = &mut *source.cell.state.borrow_mut()
                {
                    pending.extend(listeners);
                }
            }
            Outcome::Value(value) => {
                *self.cell.state.borrow_mut() = State::Value(value);
                work.extend(listeners.into_iter().map(|l| (self.clone(), l)));
            }
            Outcome::Error(error) => {
                if listeners.is_empty() && !self.cell.ignored.get() {
                    self.cell.zone.report_uncaught(rt, error.clone());
                }
                *self.cell.state.borrow_mut() = State::Error(error);
                work.extend(listeners.into_iter().map(|l| (self.clone(), l)));
            }
        }
    }

    fn take_listeners(&self) -> Option<Vec<Listener>> {
        match &mut *self.cell.state.borrow_mut() {
            State::Pending { listeners, .. } => Some(std::mem::take(listeners)),
            _ => None,
        }
    }

    fn run_listener(
        &self,
        rt: &Runtime,
        result: Result<Value, AsyncError>,
        listener: Listener,
        work: &mut Work,
    ) {
        let Listener {
            handler,
            result: target,
            zone,
        } = listener;

        // Errors stay inside their error zone.
        if let Err(error) = &result
            && !zone.in_same_error_zone(&self.cell.zone)
        {
            self.cell.zone.report_uncaught(rt, error.clone());
            return;
        }

        let reaction = zone.run(rt, |rt| handler.invoke(rt, result));
        let Some(target) = target else {
            if let Reaction::Error(error) = reaction {
                zone.report_uncaught(rt, error);
            }
            return;
        };
        match reaction {
            Reaction::Value(value) => {
                let outcome = outcome_for(rt, target.element(), value);
                target.complete_now(rt, outcome, work);
            }
            Reaction::Error(error) => target.complete_now(rt, Outcome::Error(error), work),
            Reaction::After(future, original) => future.add_listener(
                rt,
                Listener {
                    handler: Handler::Then {
                        on_value: Box::new(move |_, _| original),
                        on_error: None,
                    },
                    result: Some(target),
                    zone,
                },
            ),
            Reaction::Done => {}
        }
    }
}

/// Assimilates a `Future<T>` value; casts anything else to `T`.
fn outcome_for(rt: &Runtime, element: TypeId, value: Value) -> Outcome {
    if let Some(future) = Future::from_value(&value) {
        let expected = rt.universe().future(element);
        if rt.universe().is_instance(&value, expected) {
            return Outcome::Chain(future);
        }
    }
    let cast = rt.universe().cast(value, element);
    match cast {
        Ok(value) => Outcome::Value(value),
        Err(err) => Outcome::Error(err.into()),
    }
}

fn propagate(rt: &Runtime, mut work: Work) {
    while let Some((source, listener)) = work.pop_front() {
        let Some(result) = source.terminal() else {
            continue;
        };
        source.run_listener(rt, result, listener, &mut work);
    }
}

impl fmt::Debug for Future {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("element", &self.cell.element)
            .field("state", &self.state())
            .finish()
    }
}
