//! Reactive Context
//!
//! A context is a single run of a reactive computation. Reactive values that
//! are read while a context is current register it as a dependent, and
//! invalidate it when they change.
//!
//! # Lifecycle
//!
//! A context is invalidated at most once. Invalidation only marks the context
//! and queues it with the [`Runtime`]; the callbacks registered through
//! [`Context::on_invalidate`] fire later, when the runtime flushes. A context
//! is never re-run: computations that want to react again create a fresh
//! context from one of their callbacks.
//!
//! # Implementation
//!
//! We use a thread-local stack to track the currently executing context.
//! [`Context::run`] pushes onto the stack and a guard pops it again, so the
//! previous context is restored even if the computation panics.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;
use tracing::trace;

use super::runtime::Runtime;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Context>> = const { RefCell::new(Vec::new()) };
}

/// Unique identifier for a context.
///
/// Ids come from a process-wide counter and are never reused, so they can key
/// subscriber maps without holding on to the context itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

type Callback = Box<dyn FnOnce()>;

struct ContextInner {
    id: ContextId,
    invalidated: Cell<bool>,
    /// Set once the callbacks have run during a flush.
    fired: Cell<bool>,
    callbacks: RefCell<SmallVec<[Callback; 2]>>,
}

/// A single run of a reactive computation.
///
/// Cloning a `Context` yields another handle to the same context.
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

impl Context {
    /// Create a fresh, valid context.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ContextInner {
                id: ContextId::next(),
                invalidated: Cell::new(false),
                fired: Cell::new(false),
                callbacks: RefCell::new(SmallVec::new()),
            }),
        }
    }

    /// Get the context's unique ID.
    pub fn id(&self) -> ContextId {
        self.inner.id
    }

    /// The context currently running on this thread, if any.
    pub fn current() -> Option<Context> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().cloned())
    }

    /// Whether [`invalidate`](Self::invalidate) has been called.
    pub fn is_invalidated(&self) -> bool {
        self.inner.invalidated.get()
    }

    /// Run `f` with this context installed as the current one.
    ///
    /// The previously current context is restored when `f` returns or
    /// unwinds.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = StackGuard::enter(self.clone());
        f()
    }

    /// Register a callback for the first invalidation of this context.
    ///
    /// Callbacks fire once, in registration order, when the runtime flushes
    /// the invalidated context. Registering on a context whose callbacks
    /// already fired runs `f` immediately.
    pub fn on_invalidate<F>(&self, f: F)
    where
        F: FnOnce() + 'static,
    {
        if self.inner.fired.get() {
            f();
            return;
        }
        self.inner.callbacks.borrow_mut().push(Box::new(f));
    }

    /// Invalidate the context.
    ///
    /// Only the first call has an effect: it marks the context and queues it
    /// for the next flush.
    pub fn invalidate(&self) {
        if self.inner.invalidated.replace(true) {
            return;
        }
        trace!(context = %self.id(), "context invalidated");
        Runtime::schedule(self.clone());
    }

    /// Fire the registered callbacks. Called by the runtime during a flush.
    pub(crate) fn fire(&self) {
        if self.inner.fired.replace(true) {
            return;
        }
        let callbacks = std::mem::take(&mut *self.inner.callbacks.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }

    pub(crate) fn downgrade(&self) -> WeakContext {
        WeakContext(Rc::downgrade(&self.inner))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.inner.id)
            .field("invalidated", &self.is_invalidated())
            .field("callbacks", &self.inner.callbacks.borrow().len())
            .finish()
    }
}

/// Non-owning handle to a context.
///
/// Combinators keep one of these to their active context so they can
/// invalidate it on disposal without keeping it alive.
#[derive(Clone)]
pub(crate) struct WeakContext(Weak<ContextInner>);

impl WeakContext {
    pub(crate) fn upgrade(&self) -> Option<Context> {
        self.0.upgrade().map(|inner| Context { inner })
    }
}

/// Guard that pops the context stack when dropped.
struct StackGuard {
    id: ContextId,
}

impl StackGuard {
    fn enter(context: Context) -> Self {
        let id = context.id();
        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(context));
        Self { id }
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(context) = popped {
                debug_assert_eq!(
                    context.id(),
                    self.id,
                    "context stack mismatch: expected {}, got {}",
                    self.id,
                    context.id()
                );
            }
        });
    }
}
