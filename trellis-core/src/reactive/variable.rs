//! Reactive Variable
//!
//! A reactive variable holds a value and tracks which contexts depend on it.
//! There are two ways to depend on a variable:
//!
//! - Reading it with [`ReactiveVariable::read`]. The reader is invalidated
//!   on every change.
//! - Testing it with [`ReactiveVariable::equals_to`]. The tester is only
//!   invalidated when the variable moves into or out of the tested value.
//!
//! Equality testers live in an [`EqualityPartition`], so a write only wakes
//! the testers of the old and new values.
//!
//! # Memory Layout
//!
//! Each variable consists of:
//! - An optional name, used in log output
//! - The current value
//! - The plain subscriber set (readers)
//! - The equality partition (testers), one bucket per watched value

use std::cell::RefCell;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use tracing::trace;

use super::partition::EqualityPartition;
use super::subscriber::SubscriberSet;

struct VariableInner<V> {
    name: Option<String>,
    current: RefCell<V>,
    readers: SubscriberSet,
    partition: EqualityPartition<V>,
}

/// A mutable cell whose reads and equality tests are tracked.
///
/// # Type Parameters
///
/// - `V`: The type of value stored. Values key the equality partition, so
///   they must be `Eq + Hash`.
///
/// # Example
///
/// ```rust,ignore
/// let page = ReactiveVariable::new("home");
///
/// repeat({
///     let page = page.clone();
///     move || println!("at home: {}", page.equals_to(&"home"))
/// });
///
/// page.set("settings");
/// Runtime::flush()?; // prints "at home: false"
/// ```
pub struct ReactiveVariable<V> {
    inner: Rc<VariableInner<V>>,
}

impl<V> ReactiveVariable<V>
where
    V: Clone + Eq + Hash + 'static,
{
    /// Create a new variable with the given initial value.
    pub fn new(value: V) -> Self {
        Self::build(None, value)
    }

    /// Create a new variable carrying a name for log output.
    pub fn named(name: impl Into<String>, value: V) -> Self {
        Self::build(Some(name.into()), value)
    }

    fn build(name: Option<String>, value: V) -> Self {
        Self {
            inner: Rc::new(VariableInner {
                name,
                current: RefCell::new(value),
                readers: SubscriberSet::new(),
                partition: EqualityPartition::new(),
            }),
        }
    }

    /// The variable's name, if it was given one.
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Get the current value.
    ///
    /// If called within a context, the context is invalidated by the next
    /// change to this variable.
    pub fn read(&self) -> V {
        self.inner.readers.track();
        self.inner.current.borrow().clone()
    }

    /// Get the current value without registering a dependency.
    pub fn read_untracked(&self) -> V {
        self.inner.current.borrow().clone()
    }

    /// Read with tracking chosen at runtime.
    pub fn read_with(&self, untracked: bool) -> V {
        if untracked {
            self.read_untracked()
        } else {
            self.read()
        }
    }

    /// Check whether the current value equals `candidate`.
    ///
    /// If called within a context, the context is invalidated only when the
    /// variable changes to or from `candidate`.
    pub fn equals_to(&self, candidate: &V) -> bool {
        self.inner.partition.track(candidate);
        *self.inner.current.borrow() == *candidate
    }

    /// Set a new value and invalidate dependents.
    ///
    /// Writing the value already held does nothing. Otherwise readers are
    /// invalidated first, then testers of the old value, then testers of the
    /// new value, and only then is the new value stored.
    pub fn set(&self, value: V) {
        if *self.inner.current.borrow() == value {
            return;
        }

        let readers = self.inner.readers.invalidate_all();
        let old_watchers = self
            .inner
            .partition
            .invalidate(&*self.inner.current.borrow());
        let new_watchers = self.inner.partition.invalidate(&value);

        trace!(
            variable = self.name().unwrap_or("<anonymous>"),
            readers,
            old_watchers,
            new_watchers,
            "variable changed"
        );

        *self.inner.current.borrow_mut() = value;
    }

    /// Update the value using a function of the current one.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&V) -> V,
    {
        let value = f(&*self.inner.current.borrow());
        self.set(value);
    }

    /// Number of contexts subscribed through [`read`](Self::read).
    pub fn reader_count(&self) -> usize {
        self.inner.readers.len()
    }

    /// Number of distinct values currently watched through
    /// [`equals_to`](Self::equals_to).
    pub fn watched_value_count(&self) -> usize {
        self.inner.partition.bucket_count()
    }

    /// Number of contexts watching for `value`.
    pub fn watcher_count(&self, value: &V) -> usize {
        self.inner.partition.watcher_count(value)
    }
}

impl<V> Clone for ReactiveVariable<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V> Debug for ReactiveVariable<V>
where
    V: Clone + Eq + Hash + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveVariable")
            .field("name", &self.inner.name)
            .field("value", &*self.inner.current.borrow())
            .field("readers", &self.reader_count())
            .field("watched_values", &self.watched_value_count())
            .finish()
    }
}
