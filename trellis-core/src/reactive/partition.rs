//! Equality Partition Index
//!
//! Tracks contexts that asked "is the value currently equal to `v`?",
//! bucketed by `v`. A change from `a` to `b` only needs to wake the `a` and
//! `b` buckets; everyone watching some other value is unaffected by it.
//!
//! Buckets are deleted as soon as their last context leaves, so memory is
//! bounded by the live subscriptions rather than by every value ever asked
//! about.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use tracing::trace;

use super::context::Context;
use super::subscriber::{insert_once, invalidate_each, Subscribers};

/// Map from a watched value to the contexts watching it.
pub struct EqualityPartition<V> {
    buckets: Rc<RefCell<HashMap<V, Subscribers>>>,
}

impl<V> EqualityPartition<V>
where
    V: Clone + Eq + Hash + 'static,
{
    /// Create an empty partition.
    pub fn new() -> Self {
        Self {
            buckets: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Subscribe the currently running context to `value`, if there is one.
    pub fn track(&self, value: &V) -> bool {
        match Context::current() {
            Some(context) => self.subscribe(value, &context),
            None => false,
        }
    }

    /// Subscribe `context` to `value` until it is invalidated.
    pub fn subscribe(&self, value: &V, context: &Context) -> bool {
        if context.is_invalidated() {
            return false;
        }
        {
            let mut buckets = self.buckets.borrow_mut();
            let bucket = buckets.entry(value.clone()).or_default();
            if !insert_once(bucket, context) {
                return false;
            }
        }

        let id = context.id();
        let buckets = Rc::downgrade(&self.buckets);
        let value = value.clone();
        context.on_invalidate(move || {
            let Some(buckets) = buckets.upgrade() else {
                return;
            };
            let mut buckets = buckets.borrow_mut();
            if let Some(bucket) = buckets.get_mut(&value) {
                bucket.shift_remove(&id);
                if bucket.is_empty() {
                    buckets.remove(&value);
                }
            }
        });

        trace!(context = %id, "subscribed to value");
        true
    }

    /// Invalidate every context watching `value` and drop its bucket.
    ///
    /// Returns the number of contexts invalidated.
    pub fn invalidate(&self, value: &V) -> usize {
        let bucket = self.buckets.borrow_mut().remove(value);
        bucket.map_or(0, invalidate_each)
    }

    /// Number of values with at least one watcher.
    pub fn bucket_count(&self) -> usize {
        self.buckets.borrow().len()
    }

    /// Number of contexts watching `value`.
    pub fn watcher_count(&self, value: &V) -> usize {
        self.buckets.borrow().get(value).map_or(0, |bucket| bucket.len())
    }
}

impl<V> Default for EqualityPartition<V>
where
    V: Clone + Eq + Hash + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for EqualityPartition<V> {
    fn clone(&self) -> Self {
        Self {
            buckets: Rc::clone(&self.buckets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Runtime;

    #[test]
    fn subscriptions_are_bucketed_by_value() {
        let partition = EqualityPartition::new();
        let a = Context::new();
        let b = Context::new();

        a.run(|| partition.track(&"a"));
        b.run(|| {
            partition.track(&"a");
            partition.track(&"b");
        });

        assert_eq!(partition.bucket_count(), 2);
        assert_eq!(partition.watcher_count(&"a"), 2);
        assert_eq!(partition.watcher_count(&"b"), 1);
        assert_eq!(partition.watcher_count(&"c"), 0);
    }

    #[test]
    fn repeated_tracking_subscribes_once() {
        let partition = EqualityPartition::new();
        let context = Context::new();

        context.run(|| {
            assert!(partition.track(&1));
            assert!(!partition.track(&1));
        });

        assert_eq!(partition.watcher_count(&1), 1);
    }

    #[test]
    fn invalidate_only_touches_matching_bucket() {
        let partition = EqualityPartition::new();
        let a = Context::new();
        let b = Context::new();
        a.run(|| partition.track(&"a"));
        b.run(|| partition.track(&"b"));

        assert_eq!(partition.invalidate(&"a"), 1);
        assert!(a.is_invalidated());
        assert!(!b.is_invalidated());
        assert_eq!(partition.bucket_count(), 1);

        assert_eq!(partition.invalidate(&"zzz"), 0);
        Runtime::flush().unwrap();
    }

    #[test]
    fn empty_buckets_are_pruned() {
        let partition = EqualityPartition::new();
        let context = Context::new();
        context.run(|| {
            for n in 0..100 {
                partition.track(&n);
            }
        });
        assert_eq!(partition.bucket_count(), 100);

        // Invalidated by some unrelated source
        context.invalidate();
        Runtime::flush().unwrap();

        assert_eq!(partition.bucket_count(), 0);
    }

    #[test]
    fn bucket_survives_while_others_watch() {
        let partition = EqualityPartition::new();
        let first = Context::new();
        let second = Context::new();
        first.run(|| partition.track(&7));
        second.run(|| partition.track(&7));

        first.invalidate();
        Runtime::flush().unwrap();

        assert_eq!(partition.bucket_count(), 1);
        assert_eq!(partition.watcher_count(&7), 1);
    }
}
