//! Subscriber sets for the reactive system.
//!
//! A subscriber set holds the contexts that depend on some reactive value.
//! Every context removes itself when it is invalidated, so the set only ever
//! holds live subscriptions.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use super::context::{Context, ContextId};

/// Contexts keyed by id, in subscription order.
pub(crate) type Subscribers = IndexMap<ContextId, Context>;

/// Invalidate every context in `subscribers`, returning how many there were.
pub(crate) fn invalidate_each(subscribers: Subscribers) -> usize {
    let count = subscribers.len();
    for context in subscribers.into_values() {
        context.invalidate();
    }
    count
}

/// Insert `context` into `subscribers` unless it is already there.
pub(crate) fn insert_once(subscribers: &mut Subscribers, context: &Context) -> bool {
    let id = context.id();
    if subscribers.contains_key(&id) {
        return false;
    }
    subscribers.insert(id, context.clone());
    true
}

/// A self-cleaning set of dependent contexts.
///
/// Cloning a `SubscriberSet` yields another handle to the same set.
#[derive(Clone, Default)]
pub struct SubscriberSet {
    contexts: Rc<RefCell<Subscribers>>,
}

impl SubscriberSet {
    /// Create an empty subscriber set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe the currently running context, if there is one.
    ///
    /// Returns `true` if a new subscription was made.
    pub fn track(&self) -> bool {
        match Context::current() {
            Some(context) => self.subscribe(&context),
            None => false,
        }
    }

    /// Subscribe `context` until it is invalidated.
    ///
    /// A context already in the set, or already invalidated, is left alone.
    pub fn subscribe(&self, context: &Context) -> bool {
        if context.is_invalidated() {
            return false;
        }
        if !insert_once(&mut self.contexts.borrow_mut(), context) {
            return false;
        }

        let id = context.id();
        let contexts = Rc::downgrade(&self.contexts);
        context.on_invalidate(move || {
            if let Some(contexts) = contexts.upgrade() {
                contexts.borrow_mut().shift_remove(&id);
            }
        });

        trace!(context = %id, "subscribed");
        true
    }

    /// Invalidate and remove every subscribed context.
    ///
    /// Returns the number of contexts invalidated.
    pub fn invalidate_all(&self) -> usize {
        let drained = std::mem::take(&mut *self.contexts.borrow_mut());
        invalidate_each(drained)
    }

    /// Check whether a context is subscribed.
    pub fn contains(&self, id: ContextId) -> bool {
        self.contexts.borrow().contains_key(&id)
    }

    /// Get the number of subscribed contexts.
    pub fn len(&self) -> usize {
        self.contexts.borrow().len()
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.contexts.borrow().is_empty()
    }
}

impl std::fmt::Debug for SubscriberSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.contexts.borrow().keys()).finish()
    }
}
