//! Integration Tests for Reactive System
//!
//! These tests verify that variables, contexts and the combinators work
//! together through the public API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use trellis_core::reactive::{
    isolate, memoize, repeat, wait_until, Context, Memo, ReactiveVariable, Runtime, VariableScope,
};
use trellis_core::{ReactiveError, RuntimeConfig};

/// Set `foo` to "first", run `callback` in a fresh context, then move `foo`
/// to "second" and report whether the context was invalidated.
fn code_invalidates(foo: &ReactiveVariable<&'static str>, callback: impl FnOnce()) -> bool {
    foo.set("first");
    Runtime::flush().unwrap();

    let context = Context::new();
    let invalidated = Rc::new(Cell::new(false));
    let invalidated_clone = invalidated.clone();
    context.on_invalidate(move || invalidated_clone.set(true));
    context.run(callback);
    assert!(!invalidated.get());

    foo.set("second");
    Runtime::flush().unwrap();
    invalidated.get()
}

/// Test the basic read / equals / set cycle on a scoped variable.
#[test]
fn reactive_variable_basics() {
    let mut obj = VariableScope::new();
    let foo = obj.add_reactive_variable("foo", "default");

    assert_eq!(foo.read(), "default");
    assert!(foo.equals_to(&"default"));
    assert!(!foo.equals_to(&"random"));

    foo.set("random");
    assert_eq!(foo.read(), "random");
    assert!(!foo.equals_to(&"default"));
    assert!(foo.equals_to(&"random"));

    // Resetting to the same value must not break anything
    foo.set("random");
    assert_eq!(obj.get("foo").unwrap().read(), "random");
}

/// Test which kinds of access make a context depend on a variable.
#[test]
fn reactive_variable_reactivity() {
    let mut obj = VariableScope::new();
    let foo = obj.add_reactive_variable("foo", "default");
    let bar = obj.add_reactive_variable("bar", "default");

    // A tracked read always invalidates when foo changes
    assert!(code_invalidates(&foo, || assert_eq!(foo.read(), "first")));

    // Reading another variable never does
    assert!(!code_invalidates(&foo, || assert_eq!(bar.read(), "default")));

    // An untracked read never does
    assert!(!code_invalidates(&foo, || assert_eq!(foo.read_with(true), "first")));

    // first -> second leaves "first"
    assert!(code_invalidates(&foo, || assert!(foo.equals_to(&"first"))));

    // first -> second enters "second"
    assert!(code_invalidates(&foo, || assert!(!foo.equals_to(&"second"))));

    // "third" is not involved in first -> second
    assert!(!code_invalidates(&foo, || assert!(!foo.equals_to(&"third"))));
}

/// Test that an equality subscription only reacts to its own value.
#[test]
fn equality_tracks_only_its_value() {
    let foo = ReactiveVariable::new("default");
    let invalidations = Rc::new(Cell::new(0));

    let foo_clone = foo.clone();
    let invalidations_clone = invalidations.clone();
    let first_run = Rc::new(Cell::new(true));
    repeat(move || {
        foo_clone.equals_to(&"5");
        if !first_run.replace(false) {
            invalidations_clone.set(invalidations_clone.get() + 1);
        }
    });

    foo.set("3");
    Runtime::flush().unwrap();
    assert_eq!(invalidations.get(), 0);

    foo.set("5");
    Runtime::flush().unwrap();
    assert_eq!(invalidations.get(), 1);
}

/// Test that repeat re-runs once per flush after a change.
#[test]
fn repeat_reruns_after_changes() {
    let foo = ReactiveVariable::new(0);
    let repeat_called = Rc::new(Cell::new(0));

    let foo_clone = foo.clone();
    let repeat_called_clone = repeat_called.clone();
    repeat(move || {
        foo_clone.read();
        repeat_called_clone.set(repeat_called_clone.get() + 1);
    });
    assert_eq!(repeat_called.get(), 1);

    foo.set(3);
    Runtime::flush().unwrap();
    assert_eq!(repeat_called.get(), 2);

    foo.set(5);
    Runtime::flush().unwrap();
    assert_eq!(repeat_called.get(), 3);
}

/// Test that isolate fences off the reads of the enclosing loop.
#[test]
fn isolate_fences_dependencies() {
    let foo = ReactiveVariable::new(0);
    let repeat_called = Rc::new(Cell::new(0));

    let foo_clone = foo.clone();
    let repeat_called_clone = repeat_called.clone();
    repeat(move || {
        let ret = isolate(|| foo_clone.read());
        assert_eq!(ret, 0);
        repeat_called_clone.set(repeat_called_clone.get() + 1);
    });
    assert_eq!(repeat_called.get(), 1);

    foo.set(3);
    Runtime::flush().unwrap();
    assert_eq!(repeat_called.get(), 1);

    foo.set(5);
    Runtime::flush().unwrap();
    assert_eq!(repeat_called.get(), 1);
}

/// Test that wait_until fires exactly once.
#[test]
fn wait_until_fires_once() {
    let foo = ReactiveVariable::new(0);
    let await_called = Rc::new(Cell::new(0));

    let foo_clone = foo.clone();
    let await_called_clone = await_called.clone();
    let watch = wait_until(move || foo_clone.equals_to(&5), move || {
        await_called_clone.set(await_called_clone.get() + 1);
    });
    assert_eq!(await_called.get(), 0);

    foo.set(3);
    Runtime::flush().unwrap();
    assert_eq!(await_called.get(), 0);

    foo.set(5);
    Runtime::flush().unwrap();
    assert_eq!(await_called.get(), 1);
    assert!(watch.is_resolved());

    foo.set(6);
    Runtime::flush().unwrap();
    assert_eq!(await_called.get(), 1);

    foo.set(5);
    Runtime::flush().unwrap();
    assert_eq!(await_called.get(), 1);
}

/// Test that a memo is shared by its dependents and never read stale.
#[test]
fn memoize_shares_one_evaluation() {
    let foo = ReactiveVariable::new(0);

    let inner_called = Rc::new(Cell::new(0));
    let foo_clone = foo.clone();
    let inner_called_clone = inner_called.clone();
    let memo = memoize(move || {
        inner_called_clone.set(inner_called_clone.get() + 1);
        foo_clone.read()
    });
    Runtime::flush().unwrap();
    assert_eq!(inner_called.get(), 1);

    let dependent = |called: &Rc<Cell<i32>>| {
        let memo = memo.clone();
        let foo = foo.clone();
        let called = called.clone();
        repeat(move || {
            assert_eq!(memo.get(), foo.read_untracked());
            called.set(called.get() + 1);
        });
    };

    let first_called = Rc::new(Cell::new(0));
    dependent(&first_called);
    Runtime::flush().unwrap();
    assert_eq!(inner_called.get(), 1);
    assert_eq!(first_called.get(), 1);

    let second_called = Rc::new(Cell::new(0));
    dependent(&second_called);
    Runtime::flush().unwrap();
    assert_eq!(inner_called.get(), 1);
    assert_eq!(first_called.get(), 1);
    assert_eq!(second_called.get(), 1);

    foo.set(3);
    Runtime::flush().unwrap();
    assert_eq!(inner_called.get(), 2);
    assert_eq!(first_called.get(), 2);
    assert_eq!(second_called.get(), 2);

    foo.set(4);
    Runtime::flush().unwrap();
    assert_eq!(inner_called.get(), 3);
    assert_eq!(first_called.get(), 3);
    assert_eq!(second_called.get(), 3);
}

/// Test that a dependent reading both the source and the memo ends the
/// flush with the fresh result, whichever re-ran first.
#[test]
fn memo_dependent_settles_on_fresh_value() {
    let foo = ReactiveVariable::new(1);
    let seen = Rc::new(RefCell::new(Vec::new()));

    // This loop subscribes to foo before the memo does
    let doubled_slot: Rc<RefCell<Option<Memo<i32>>>> = Rc::new(RefCell::new(None));

    let foo_clone = foo.clone();
    let slot_clone = doubled_slot.clone();
    let seen_clone = seen.clone();
    repeat(move || {
        let source = foo_clone.read();
        if let Some(doubled) = slot_clone.borrow().as_ref() {
            seen_clone.borrow_mut().push((source, doubled.get()));
        }
    });

    let foo_clone = foo.clone();
    *doubled_slot.borrow_mut() = Some(memoize(move || foo_clone.read() * 2));

    // Pick up the memo on the next run
    foo.set(2);
    Runtime::flush().unwrap();
    foo.set(3);
    Runtime::flush().unwrap();

    // The loop ran before the memo on the first change and saw the old
    // result; the recompute poked it again within the same flush.
    assert_eq!(*seen.borrow(), vec![(2, 2), (2, 4), (3, 6)]);
}

/// Test that a self-feeding loop is caught by the flush pass limit.
#[test]
fn runaway_loop_reports_flush_limit() {
    Runtime::configure(RuntimeConfig::from_json(r#"{ "max_flush_passes": 16 }"#).unwrap());

    let foo = ReactiveVariable::new(0);
    let foo_clone = foo.clone();
    let runaway = repeat(move || {
        let value = foo_clone.read();
        foo_clone.set(value + 1);
    });

    foo.set(100);
    let err = Runtime::flush().unwrap_err();
    assert!(matches!(err, ReactiveError::FlushLimitExceeded { passes: 16 }));

    runaway.stop();
    Runtime::configure(RuntimeConfig::default());
    Runtime::flush().unwrap();
    assert_eq!(Runtime::pending(), 0);
}
