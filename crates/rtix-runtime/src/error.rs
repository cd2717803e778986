use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::rc::Rc;

use rtix_types::{TypeError, Value};

/// Trace captured where an asynchronous error was raised.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackTrace(Option<Rc<str>>);

impl StackTrace {
    pub fn new(text: impl Into<Rc<str>>) -> Self {
        Self(Some(text.into()))
    }

    pub fn empty() -> Self {
        Self(None)
    }

    /// Captures the native backtrace when `RUST_BACKTRACE` enables it.
    pub fn capture() -> Self {
        let backtrace = Backtrace::capture();
        match backtrace.status() {
            BacktraceStatus::Captured => Self::new(backtrace.to_string()),
            _ => Self::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(text) => f.write_str(text),
            None => Ok(()),
        }
    }
}

/// An error travelling along a future chain: the thrown value plus the trace
/// of the place that raised it.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct AsyncError {
    pub error: Value,
    pub message: String,
    pub trace: StackTrace,
}

impl AsyncError {
    pub fn new(error: Value) -> Self {
        let message = match &error {
            Value::Str(s) => s.to_string(),
            other => format!("{other:?}"),
        };
        Self {
            error,
            message,
            trace: StackTrace::empty(),
        }
    }

    /// An error whose thrown value is the string `message`.
    pub fn msg(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            error: Value::string(&message),
            message,
            trace: StackTrace::empty(),
        }
    }

    pub fn with_trace(mut self, trace: StackTrace) -> Self {
        self.trace = trace;
        self
    }
}

impl From<TypeError> for AsyncError {
    fn from(err: TypeError) -> Self {
        AsyncError::msg(err.to_string()).with_trace(StackTrace::capture())
    }
}

/// Errors returned synchronously by [`Completer`](crate::Completer).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CompleteError {
    #[error("future already completed")]
    AlreadyCompleted,

    #[error(transparent)]
    Type(#[from] TypeError),
}
