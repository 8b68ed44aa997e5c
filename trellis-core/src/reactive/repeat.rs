//! Repeat Implementation
//!
//! `repeat` runs a body now, and again every time a flush processes an
//! invalidation of the body's last run.
//!
//! # How It Works
//!
//! 1. Each run happens inside a fresh [`Context`], so the body's reads
//!    register that context as a dependent.
//!
//! 2. Before the body runs, the context gets an invalidation callback that
//!    performs the next step: a new context, and another run of the body.
//!
//! 3. The loop is kept alive by whatever the body depends on: the current
//!    context is held by the values it read, and its callback holds the
//!    loop. A body that reads nothing reactive runs once and is released.
//!
//! Steps are driven by the flush loop, one at a time, so the call stack does
//! not grow with the number of runs.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use super::context::{Context, WeakContext};

struct RepeatInner {
    body: Box<dyn Fn()>,
    stopped: Cell<bool>,
    active: RefCell<Option<WeakContext>>,
    runs: Cell<usize>,
}

impl RepeatInner {
    fn step(this: &Rc<Self>) {
        let context = Context::new();

        let next = Rc::clone(this);
        context.on_invalidate(move || {
            if !next.stopped.get() {
                RepeatInner::step(&next);
            }
        });

        *this.active.borrow_mut() = Some(context.downgrade());
        this.runs.set(this.runs.get() + 1);
        debug!(context = %context.id(), run = this.runs.get(), "repeat step");

        context.run(|| (this.body)());
    }
}

/// Handle to a running [`repeat`] loop.
///
/// Dropping the handle leaves the loop running; call [`Repeat::stop`] to end
/// it.
#[derive(Clone)]
pub struct Repeat {
    inner: Rc<RepeatInner>,
}

impl Repeat {
    /// Stop the loop.
    ///
    /// The active run is invalidated so its subscriptions are released on
    /// the next flush; no further run happens.
    pub fn stop(&self) {
        if self.inner.stopped.replace(true) {
            return;
        }
        let active = self.inner.active.borrow().as_ref().and_then(WeakContext::upgrade);
        if let Some(context) = active {
            context.invalidate();
        }
        debug!(runs = self.inner.runs.get(), "repeat stopped");
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.get()
    }

    /// Number of times the body has run.
    pub fn run_count(&self) -> usize {
        self.inner.runs.get()
    }
}

impl std::fmt::Debug for Repeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repeat")
            .field("runs", &self.run_count())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Run `body` now, and re-run it on every flush that follows an invalidation
/// of its previous run.
///
/// # Example
///
/// ```rust,ignore
/// let page = ReactiveVariable::new("home");
///
/// repeat({
///     let page = page.clone();
///     move || println!("page: {}", page.read())
/// }); // prints "page: home"
///
/// page.set("settings");
/// Runtime::flush()?; // prints "page: settings"
/// ```
pub fn repeat<F>(body: F) -> Repeat
where
    F: Fn() + 'static,
{
    let inner = Rc::new(RepeatInner {
        body: Box::new(body),
        stopped: Cell::new(false),
        active: RefCell::new(None),
        runs: Cell::new(0),
    });
    RepeatInner::step(&inner);
    Repeat { inner }
}
