use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rtix_types::{TypeId, Value};

use crate::{AsyncError, Completer, Future, FutureState, ManualHost, Runtime, ZoneSpec};

type Log = Rc<RefCell<Vec<String>>>;

fn setup() -> (Runtime, TypeId) {
    let rt = Runtime::new(ManualHost::new());
    let int = rt.universe().core().int;
    (rt, int)
}

fn record(log: &Log, label: &str) -> impl FnOnce(&Runtime, Value) -> Result<Value, AsyncError> + 'static {
    let log = log.clone();
    let label = label.to_string();
    move |_, value| {
        log.borrow_mut().push(format!("{label} {value:?}"));
        Ok(value)
    }
}

fn increment(_: &Runtime, value: Value) -> Result<Value, AsyncError> {
    Ok(Value::Int(value.as_int().unwrap_or_default() + 1))
}

#[test]
fn continuations_run_in_a_later_drain_in_order() {
    let (rt, int) = setup();
    let log = Log::default();
    let completer = Completer::new(&rt, int);

    let first = completer.future().then(&rt, int, record(&log, "a"));
    let second = first.then(&rt, int, increment).then(&rt, int, record(&log, "b"));
    completer.complete(&rt, Value::Int(1)).unwrap();
    assert!(log.borrow().is_empty());

    rt.drain();
    insta::assert_snapshot!(log.borrow().join("\n"), @r"
    a Int(1)
    b Int(2)
    ");
    assert_eq!(second.result(), Some(Ok(Value::Int(2))));
}

#[test]
fn listening_on_a_completed_future_is_still_deferred() {
    let (rt, int) = setup();
    let log = Log::default();
    let completer = Completer::sync(&rt, int);
    completer.complete(&rt, Value::Int(7)).unwrap();
    assert_eq!(completer.future().state(), FutureState::Value);

    completer.future().then(&rt, int, record(&log, "late"));
    assert!(log.borrow().is_empty());

    rt.drain();
    assert_eq!(*log.borrow(), ["late Int(7)"]);
}

#[test]
fn errors_skip_value_handlers_until_caught() {
    let (rt, int) = setup();
    let log = Log::default();
    let completer = Completer::new(&rt, int);

    let handled = completer
        .future()
        .then(&rt, int, |_, _| Err(AsyncError::msg("boom")))
        .then(&rt, int, record(&log, "success"))
        .catch_error(&rt, {
            let log = log.clone();
            move |_, error| {
                log.borrow_mut().push(format!("caught {error}"));
                Ok(Value::Int(0))
            }
        });
    completer.complete(&rt, Value::Int(1)).unwrap();
    rt.drain();

    assert_eq!(*log.borrow(), ["caught boom"]);
    assert_eq!(handled.result(), Some(Ok(Value::Int(0))));
    assert!(rt.take_uncaught_errors().is_empty());
}

#[test]
fn unhandled_error_is_reported_once() {
    let (rt, int) = setup();
    let completer = Completer::new(&rt, int);
    let failed = completer
        .future()
        .then(&rt, int, |_, _| Err(AsyncError::msg("boom")));
    completer.complete(&rt, Value::Int(1)).unwrap();
    rt.drain();
    rt.drain();

    let errors = rt.take_uncaught_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "boom");
    assert_eq!(failed.state(), FutureState::Error);
}

#[test]
fn late_catch_still_handles_a_reported_error() {
    let (rt, int) = setup();
    let future = Future::error(&rt, int, AsyncError::msg("early"));
    rt.drain();
    assert_eq!(rt.take_uncaught_errors().len(), 1);

    let caught = Rc::new(RefCell::new(None));
    let seen = caught.clone();
    let recovered = future.catch_error(&rt, move |_, error| {
        *seen.borrow_mut() = Some(error.message);
        Ok(Value::Int(0))
    });
    rt.drain();

    assert_eq!(caught.borrow().as_deref(), Some("early"));
    assert_eq!(recovered.result(), Some(Ok(Value::Int(0))));
    assert!(rt.take_uncaught_errors().is_empty());
}

#[test]
fn error_handler_of_then_recovers() {
    let (rt, int) = setup();
    let future = Future::error(&rt, int, AsyncError::msg("bad"));
    let recovered = future.then_or_else(&rt, int, increment, |_, _| Ok(Value::Int(-1)));
    rt.drain();

    assert_eq!(recovered.result(), Some(Ok(Value::Int(-1))));
    assert!(rt.take_uncaught_errors().is_empty());
}

#[test]
fn catch_error_test_filters_errors() {
    let (rt, int) = setup();
    let caught = Rc::new(Cell::new(false));
    let flag = caught.clone();
    let future = Future::error(&rt, int, AsyncError::msg("timeout"));
    let result = future.catch_error_where(
        &rt,
        move |_, _| {
            flag.set(true);
            Ok(Value::Int(0))
        },
        |_, error| error.message == "cancelled",
    );
    rt.drain();

    assert!(!caught.get());
    assert_eq!(result.state(), FutureState::Error);
    assert_eq!(rt.take_uncaught_errors().len(), 1);
}

#[test]
fn completing_with_a_future_adopts_its_result() {
    let (rt, int) = setup();
    let log = Log::default();
    let outer = Completer::new(&rt, int);
    let inner = Completer::new(&rt, int);
    outer.future().then(&rt, int, record(&log, "seen"));

    outer.complete(&rt, inner.future().to_value()).unwrap();
    rt.drain();
    assert_eq!(outer.future().state(), FutureState::Chained);
    assert!(log.borrow().is_empty());

    inner.complete(&rt, Value::Int(5)).unwrap();
    rt.drain();
    assert_eq!(*log.borrow(), ["seen Int(5)"]);
    assert_eq!(outer.future().result(), Some(Ok(Value::Int(5))));
}

#[test]
fn assimilation_follows_a_chain_of_futures() {
    let (rt, int) = setup();
    let log = Log::default();
    let first = Completer::new(&rt, int);
    let middle = Completer::new(&rt, int);
    let last = Completer::new(&rt, int);
    first.future().then(&rt, int, record(&log, "seen"));

    first.complete(&rt, middle.future().to_value()).unwrap();
    rt.drain();
    middle.complete(&rt, last.future().to_value()).unwrap();
    rt.drain();
    assert_eq!(first.future().state(), FutureState::Chained);
    assert_eq!(middle.future().state(), FutureState::Chained);
    assert!(log.borrow().is_empty());

    last.complete(&rt, Value::Int(5)).unwrap();
    rt.drain();
    assert_eq!(*log.borrow(), ["seen Int(5)"]);
    assert_eq!(first.future().result(), Some(Ok(Value::Int(5))));
}

#[test]
fn completing_with_a_finished_future_copies_its_result() {
    let (rt, int) = setup();
    let done = Completer::sync(&rt, int);
    done.complete(&rt, Value::Int(9)).unwrap();
    let outer = Completer::new(&rt, int);

    outer.complete(&rt, done.future().to_value()).unwrap();
    rt.drain();
    assert_eq!(outer.future().state(), FutureState::Value);
    assert_eq!(outer.future().result(), Some(Ok(Value::Int(9))));
}

#[test]
fn continuation_returning_a_future_is_assimilated() {
    let (rt, int) = setup();
    let gate = Completer::new(&rt, int);
    let source = Completer::new(&rt, int);
    let gate_value = gate.future().to_value();
    let result = source.future().then(&rt, int, move |_, _| Ok(gate_value));

    source.complete(&rt, Value::Int(1)).unwrap();
    rt.drain();
    assert!(!result.is_complete());

    gate.complete(&rt, Value::Int(42)).unwrap();
    rt.drain();
    assert_eq!(result.result(), Some(Ok(Value::Int(42))));
}

#[test]
fn continuation_results_are_cast() {
    let (rt, int) = setup();
    let log = Log::default();
    let source = Future::value(&rt, int, Value::Int(1)).unwrap();
    source
        .then(&rt, int, |_, _| Ok(Value::from("x")))
        .catch_error(&rt, {
            let log = log.clone();
            move |_, error| {
                log.borrow_mut().push(error.message);
                Ok(Value::Int(0))
            }
        });
    rt.drain();

    insta::assert_snapshot!(log.borrow().join("\n"), @r#""x": type 'String' is not a subtype of type 'int'"#);
}

#[test]
fn when_complete_keeps_the_result() {
    let (rt, int) = setup();
    let log = Log::default();
    let source = Future::value(&rt, int, Value::Int(3)).unwrap();
    let result = source.when_complete(&rt, {
        let log = log.clone();
        move |_| {
            log.borrow_mut().push("cleanup".to_string());
            Ok(Value::Null)
        }
    });
    rt.drain();

    assert_eq!(*log.borrow(), ["cleanup"]);
    assert_eq!(result.result(), Some(Ok(Value::Int(3))));
}

#[test]
fn when_complete_runs_on_error_and_can_replace_it() {
    let (rt, int) = setup();
    let source = Future::error(&rt, int, AsyncError::msg("first"));
    let result = source.when_complete(&rt, |_| Err(AsyncError::msg("second")));
    result.ignore();
    rt.drain();

    let Some(Err(error)) = result.result() else {
        panic!("expected an error");
    };
    assert_eq!(error.message, "second");
}

#[test]
fn when_complete_waits_for_returned_future() {
    let (rt, int) = setup();
    let dynamic = rt.universe().dynamic();
    let gate = Completer::new(&rt, dynamic);
    let gate_value = gate.future().to_value();
    let source = Future::value(&rt, int, Value::Int(1)).unwrap();
    let result = source.when_complete(&rt, move |_| Ok(gate_value));

    rt.drain();
    assert!(!result.is_complete());

    gate.complete(&rt, Value::Null).unwrap();
    rt.drain();
    assert_eq!(result.result(), Some(Ok(Value::Int(1))));
}

#[test]
fn continuation_runs_in_registration_zone() {
    let (rt, int) = setup();
    let zone = rt.root_zone().fork(ZoneSpec::new().name("request"));
    let completer = Completer::new(&rt, int);
    let seen = Rc::new(RefCell::new(String::new()));

    let record = seen.clone();
    let chained = zone.run(&rt, |rt| {
        completer.future().then(rt, int, move |rt, value| {
            *record.borrow_mut() = rt.current_zone().name().to_string();
            Ok(value)
        })
    });
    assert!(rt.current_zone().is_root());

    completer.complete(&rt, Value::Int(1)).unwrap();
    rt.drain();
    assert_eq!(*seen.borrow(), "request");
    assert_eq!(chained.zone().name(), "request");
    assert!(rt.current_zone().is_root());
}

#[test]
fn errors_do_not_cross_error_zones() {
    let (rt, int) = setup();
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = errors.clone();
    let guarded = rt.root_zone().fork(
        ZoneSpec::new()
            .name("guarded")
            .on_uncaught(move |_, zone, error| {
                sink.borrow_mut().push(format!("{}: {error}", zone.name()));
            }),
    );
    let completer = guarded.run(&rt, |rt| Completer::new(rt, int));
    let ran = Rc::new(Cell::new(false));
    let flag = ran.clone();
    let outside = completer.future().then_or_else(
        &rt,
        int,
        increment,
        move |_, error| {
            flag.set(true);
            Err(error)
        },
    );

    completer.complete_error(&rt, AsyncError::msg("bad")).unwrap();
    rt.drain();

    assert!(!ran.get());
    assert_eq!(*errors.borrow(), ["guarded: bad"]);
    assert!(rt.take_uncaught_errors().is_empty());
    assert_eq!(outside.state(), FutureState::Pending);
}

#[test]
fn ignored_future_does_not_report() {
    let (rt, int) = setup();
    let future = Future::error(&rt, int, AsyncError::msg("quiet"));
    future.ignore();
    rt.drain();

    assert!(rt.take_uncaught_errors().is_empty());
    assert_eq!(future.state(), FutureState::Error);
}

#[test]
fn value_and_error_constructors_complete_later() {
    let (rt, int) = setup();
    let value = Future::value(&rt, int, Value::Int(4)).unwrap();
    let error = Future::error(&rt, int, AsyncError::msg("no"));
    error.ignore();
    assert_eq!(value.state(), FutureState::PendingComplete);
    assert_eq!(error.state(), FutureState::PendingComplete);

    rt.drain();
    assert_eq!(value.result(), Some(Ok(Value::Int(4))));
    assert!(matches!(error.result(), Some(Err(_))));
}

#[test]
fn future_values_are_objects_implementing_future() {
    let (rt, int) = setup();
    let future = Future::value(&rt, int, Value::Int(1)).unwrap();
    let value = future.to_value();

    let mut u = rt.universe();
    let future_int = u.parse("Future<int>").unwrap();
    let future_num = u.parse("Future<num>").unwrap();
    let future_or_int = u.parse("int/").unwrap();
    let future_string = u.parse("Future<String>").unwrap();
    assert!(u.is_instance(&value, future_int));
    assert!(u.is_instance(&value, future_num));
    assert!(u.is_instance(&value, future_or_int));
    assert!(!u.is_instance(&value, future_string));
    drop(u);

    assert!(Future::from_value(&value).is_some_and(|f| f.ptr_eq(&future)));
    assert!(Future::from_value(&Value::Int(1)).is_none());
}

#[test]
fn completing_with_itself_fails() {
    let rt = Runtime::new(ManualHost::new());
    let dynamic = rt.universe().dynamic();
    let completer = Completer::sync(&rt, dynamic);
    completer.future().ignore();

    completer.complete(&rt, completer.future().to_value()).unwrap();
    let Some(Err(error)) = completer.future().result() else {
        panic!("expected an error");
    };
    assert_eq!(error.message, "a future cannot be completed with itself");
}

#[test]
fn long_chains_propagate_without_recursion() {
    let (rt, int) = setup();
    let completer = Completer::new(&rt, int);
    let mut future = completer.future().clone();
    for _ in 0..10_000 {
        future = future.then(&rt, int, increment);
    }

    completer.complete(&rt, Value::Int(0)).unwrap();
    rt.drain();
    assert_eq!(future.result(), Some(Ok(Value::Int(10_000))));
}
