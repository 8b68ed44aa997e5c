//! One-shot watcher.
//!
//! [`wait_until`] re-evaluates a reactive test on every flush that follows an
//! invalidation of its previous evaluation, and runs a callback the first
//! time the test passes. After that the watcher is resolved and never
//! subscribes again.
//!
//! The test should read reactive values (usually with `equals_to`), since
//! invalidation is the only thing that makes it run again.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use super::context::{Context, WeakContext};

/// State of a [`wait_until`] watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// The test has not passed yet.
    Watching,

    /// The test passed and the callback ran.
    Resolved,

    /// The watcher was cancelled before the test passed.
    Cancelled,
}

struct WatchInner {
    test: Box<dyn Fn() -> bool>,
    callback: RefCell<Option<Box<dyn FnOnce()>>>,
    state: Cell<WatchState>,
    active: RefCell<Option<WeakContext>>,
}

impl WatchInner {
    fn attempt(this: &Rc<Self>) {
        let context = Context::new();

        let next = Rc::clone(this);
        context.on_invalidate(move || {
            if next.state.get() == WatchState::Watching {
                WatchInner::attempt(&next);
            }
        });

        *this.active.borrow_mut() = Some(context.downgrade());

        context.run(|| {
            if (this.test)() {
                this.resolve();
            }
        });
    }

    fn resolve(&self) {
        if self.state.get() != WatchState::Watching {
            return;
        }
        self.state.set(WatchState::Resolved);
        debug!("watch resolved");

        // Release the subscriptions of the passing attempt
        let active = self.active.borrow().as_ref().and_then(WeakContext::upgrade);
        if let Some(context) = active {
            context.invalidate();
        }

        let callback = self.callback.borrow_mut().take();
        if let Some(callback) = callback {
            callback();
        }
    }
}

/// Handle to a [`wait_until`] watcher.
#[derive(Clone)]
pub struct Watch {
    inner: Rc<WatchInner>,
}

impl Watch {
    /// Current state of the watcher.
    pub fn state(&self) -> WatchState {
        self.inner.state.get()
    }

    /// Whether the test has passed and the callback has run.
    pub fn is_resolved(&self) -> bool {
        self.state() == WatchState::Resolved
    }

    /// Stop watching without running the callback.
    ///
    /// Has no effect once the watcher has resolved.
    pub fn cancel(&self) {
        if self.state() != WatchState::Watching {
            return;
        }
        self.inner.state.set(WatchState::Cancelled);
        self.inner.callback.borrow_mut().take();

        let active = self.inner.active.borrow().as_ref().and_then(WeakContext::upgrade);
        if let Some(context) = active {
            context.invalidate();
        }
        debug!("watch cancelled");
    }
}

impl std::fmt::Debug for Watch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watch").field("state", &self.state()).finish()
    }
}

/// Run `callback` once, the first time `test` returns `true`.
///
/// `test` runs immediately, and again on each flush after one of its reads
/// is invalidated. The callback may therefore run before `wait_until`
/// returns.
///
/// # Example
///
/// ```rust,ignore
/// let page = ReactiveVariable::new("login");
///
/// wait_until(
///     { let page = page.clone(); move || page.equals_to(&"home") },
///     || println!("first time at home"),
/// );
///
/// page.set("home");
/// Runtime::flush()?; // prints "first time at home"
/// ```
pub fn wait_until<T, C>(test: T, callback: C) -> Watch
where
    T: Fn() -> bool + 'static,
    C: FnOnce() + 'static,
{
    let inner = Rc::new(WatchInner {
        test: Box::new(test),
        callback: RefCell::new(Some(Box::new(callback))),
        state: Cell::new(WatchState::Watching),
        active: RefCell::new(None),
    });
    WatchInner::attempt(&inner);
    Watch { inner }
}
