//! Memo Implementation
//!
//! A Memo shares one evaluation of a computation between any number of
//! dependents.
//!
//! # How Memos Work
//!
//! 1. On creation, the memo starts a [`repeat`] loop that runs the
//!    computation and caches the result.
//!
//! 2. Reading the memo with [`Memo::get`] inside a context subscribes that
//!    context to the memo, and returns the cached result.
//!
//! 3. When one of the computation's inputs changes, the loop recomputes on
//!    the next flush, and then invalidates every subscribed dependent.
//!
//! 4. The dependents re-run later in the same flush and read the fresh
//!    result.
//!
//! # Why This Matters
//!
//! However many dependents a memo has, the computation runs once per
//! invalidation cycle.
//!
//! Dependents are invalidated after every recompute, even when the new
//! result equals the old one. Dependents never compare results, and a
//! dependent that re-ran early in the same flush is poked again once the
//! fresh result is in place, so no dependent is left holding a value from
//! before the recompute.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use tracing::debug;

use super::repeat::{repeat, Repeat};
use super::subscriber::SubscriberSet;

struct MemoInner<T> {
    result: RefCell<Option<T>>,
    dependents: SubscriberSet,
    recomputes: Cell<usize>,
    driver: RefCell<Option<Repeat>>,
}

/// A shared, cached computation.
///
/// # Type Parameters
///
/// - `T`: The type of the computed value. Readers get clones of it.
///
/// Cloning a `Memo` yields another handle to the same cache. Once every
/// handle is dropped the driving loop stops at its next run.
pub struct Memo<T> {
    inner: Rc<MemoInner<T>>,
}

impl<T> Memo<T>
where
    T: Clone + 'static,
{
    /// Get the latest result.
    ///
    /// If called within a context, the context is invalidated after the
    /// next recompute.
    pub fn get(&self) -> T {
        self.inner.dependents.track();
        self.get_untracked()
    }

    /// Get the latest result without subscribing.
    pub fn get_untracked(&self) -> T {
        self.inner
            .result
            .borrow()
            .clone()
            .expect("memo computes its first result on creation")
    }

    /// Stop recomputing.
    ///
    /// The last result stays readable.
    pub fn dispose(&self) {
        if let Some(driver) = self.inner.driver.borrow().as_ref() {
            driver.stop();
        }
    }

    /// Check if the memo has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner
            .driver
            .borrow()
            .as_ref()
            .is_some_and(Repeat::is_stopped)
    }

    /// Number of times the computation has run.
    pub fn recompute_count(&self) -> usize {
        self.inner.recomputes.get()
    }

    /// Get the number of dependents.
    pub fn dependent_count(&self) -> usize {
        self.inner.dependents.len()
    }
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Memo<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("result", &*self.inner.result.borrow())
            .field("recomputes", &self.inner.recomputes.get())
            .field("dependent_count", &self.inner.dependents.len())
            .finish()
    }
}

/// Wrap `compute` so that all of its readers share one evaluation per
/// invalidation cycle.
///
/// `compute` runs once immediately.
///
/// # Example
///
/// ```rust,ignore
/// let items = ReactiveVariable::new(vec![3, 1, 2]);
///
/// let sorted = memoize({
///     let items = items.clone();
///     move || {
///         let mut items = items.read();
///         items.sort();
///         items
///     }
/// });
///
/// // Both loops read the same sorted vector; it is sorted once per change
/// repeat({ let sorted = sorted.clone(); move || println!("{:?}", sorted.get()) });
/// repeat({ let sorted = sorted.clone(); move || println!("{}", sorted.get().len()) });
/// ```
pub fn memoize<T, F>(compute: F) -> Memo<T>
where
    T: Clone + 'static,
    F: Fn() -> T + 'static,
{
    let inner = Rc::new(MemoInner {
        result: RefCell::new(None),
        dependents: SubscriberSet::new(),
        recomputes: Cell::new(0),
        driver: RefCell::new(None),
    });

    let shared = Rc::downgrade(&inner);
    let driver = repeat(move || {
        // Every handle is gone: read nothing, so the loop is released.
        let Some(memo) = shared.upgrade() else {
            return;
        };

        let value = compute();
        *memo.result.borrow_mut() = Some(value);
        memo.recomputes.set(memo.recomputes.get() + 1);

        let forwarded = memo.dependents.invalidate_all();
        debug!(
            recompute = memo.recomputes.get(),
            dependents = forwarded,
            "memo recomputed"
        );
    });
    *inner.driver.borrow_mut() = Some(driver);

    Memo { inner }
}
