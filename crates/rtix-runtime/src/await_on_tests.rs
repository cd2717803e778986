use std::cell::RefCell;
use std::rc::Rc;

use rtix_types::Value;

use crate::{AsyncError, Completer, Future, ManualHost, Runtime, ZoneSpec, await_on};

type Log = Rc<RefCell<Vec<String>>>;

fn resume(log: &Log) -> impl FnOnce(&Runtime, Value) -> Result<(), AsyncError> + 'static {
    let log = log.clone();
    move |_, value| {
        log.borrow_mut().push(format!("value {value:?}"));
        Ok(())
    }
}

fn fail(log: &Log) -> impl FnOnce(&Runtime, AsyncError) -> Result<(), AsyncError> + 'static {
    let log = log.clone();
    move |_, error| {
        log.borrow_mut().push(format!("error {error}"));
        Ok(())
    }
}

#[test]
fn plain_values_resume_later() {
    let rt = Runtime::new(ManualHost::new());
    let log = Log::default();

    await_on(&rt, Value::Int(3), resume(&log), fail(&log));
    assert!(log.borrow().is_empty());

    rt.drain();
    assert_eq!(*log.borrow(), ["value Int(3)"]);
}

#[test]
fn futures_resume_with_their_result() {
    let rt = Runtime::new(ManualHost::new());
    let int = rt.universe().core().int;
    let log = Log::default();
    let completer = Completer::new(&rt, int);

    await_on(&rt, completer.future().to_value(), resume(&log), fail(&log));
    rt.drain();
    assert!(log.borrow().is_empty());

    completer.complete(&rt, Value::Int(8)).unwrap();
    rt.drain();
    assert_eq!(*log.borrow(), ["value Int(8)"]);
}

#[test]
fn errors_resume_the_error_path() {
    let rt = Runtime::new(ManualHost::new());
    let int = rt.universe().core().int;
    let log = Log::default();
    let future = Future::error(&rt, int, AsyncError::msg("denied"));

    await_on(&rt, future.to_value(), resume(&log), fail(&log));
    rt.drain();

    assert_eq!(*log.borrow(), ["error denied"]);
    assert!(rt.take_uncaught_errors().is_empty());
}

#[test]
fn failing_resumption_is_reported_to_the_zone() {
    let rt = Runtime::new(ManualHost::new());
    let log = Log::default();
    let sink = log.clone();
    let zone = rt.root_zone().fork(ZoneSpec::new().name("body").on_uncaught(
        move |_, _, error| sink.borrow_mut().push(format!("uncaught {error}")),
    ));

    zone.run(&rt, |rt| {
        await_on(
            rt,
            Value::Null,
            |_, _| Err(AsyncError::msg("thrown")),
            |_, error| Err(error),
        );
    });
    rt.drain();

    assert_eq!(*log.borrow(), ["uncaught thrown"]);
}
