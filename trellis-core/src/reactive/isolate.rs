//! Dependency fence.

use super::context::Context;

/// Run `f` in a throwaway context and return its result.
///
/// Reads inside `f` register the throwaway context, never the context that
/// called `isolate`, so the caller picks up no dependencies from them. The
/// throwaway context has no callbacks and `f` does not run again on its own.
pub fn isolate<R>(f: impl FnOnce() -> R) -> R {
    Context::new().run(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{repeat, ReactiveVariable, Runtime};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn returns_inner_result() {
        assert_eq!(isolate(|| 42), 42);
    }

    #[test]
    fn inner_reads_do_not_reach_outer_context() {
        let foo = ReactiveVariable::new("default");
        let outer = Context::new();

        let value = outer.run(|| isolate(|| foo.read()));
        assert_eq!(value, "default");

        foo.set("changed");
        assert!(!outer.is_invalidated());
        Runtime::flush().unwrap();
    }

    #[test]
    fn isolated_repeat_does_not_rerun() {
        let foo = ReactiveVariable::new("default");
        let run_count = Rc::new(Cell::new(0));

        let foo_clone = foo.clone();
        let run_count_clone = run_count.clone();
        repeat(move || {
            let value = isolate(|| foo_clone.read());
            assert_eq!(value, "default");
            run_count_clone.set(run_count_clone.get() + 1);
        });
        assert_eq!(run_count.get(), 1);

        foo.set("3");
        Runtime::flush().unwrap();
        assert_eq!(run_count.get(), 1);

        foo.set("5");
        Runtime::flush().unwrap();
        assert_eq!(run_count.get(), 1);
    }

    #[test]
    fn current_context_is_restored() {
        let outer = Context::new();
        outer.run(|| {
            isolate(|| assert_ne!(Context::current(), Some(outer.clone())));
            assert_eq!(Context::current(), Some(outer.clone()));
        });
    }
}
