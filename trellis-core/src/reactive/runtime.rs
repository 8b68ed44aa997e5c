//! Reactive Runtime
//!
//! The runtime owns the queue of invalidated contexts and drains it on
//! [`Runtime::flush`].
//!
//! # How It Works
//!
//! 1. `Context::invalidate` marks the context and pushes it onto the
//!    thread-local pending queue.
//!
//! 2. `flush` takes the whole queue and fires each context's invalidation
//!    callbacks, in the order the contexts were invalidated. That is one
//!    pass.
//!
//! 3. Callbacks usually create new contexts and run computations, which may
//!    invalidate further contexts. Passes repeat until the queue is empty or
//!    the configured pass limit is reached.
//!
//! # Thread Safety
//!
//! All runtime state is thread-local. Each thread is an independent reactive
//! world and contexts never cross threads.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use tracing::{debug, warn};

use super::context::Context;
use crate::config::RuntimeConfig;
use crate::error::{ReactiveError, Result};

thread_local! {
    static PENDING: RefCell<VecDeque<Context>> = const { RefCell::new(VecDeque::new()) };
    static FLUSHING: Cell<bool> = const { Cell::new(false) };
    static CONFIG: Cell<RuntimeConfig> = Cell::new(RuntimeConfig::default());
}

/// Summary of a completed flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Number of passes over the pending queue.
    pub passes: usize,
    /// Number of contexts whose callbacks were fired.
    pub contexts: usize,
}

/// The thread-local reactive runtime.
pub struct Runtime;

impl Runtime {
    /// Install a configuration for the current thread.
    pub fn configure(config: RuntimeConfig) {
        CONFIG.with(|c| c.set(config));
    }

    /// The configuration in effect on the current thread.
    pub fn config() -> RuntimeConfig {
        CONFIG.with(Cell::get)
    }

    /// Queue an invalidated context for the next flush.
    pub(crate) fn schedule(context: Context) {
        PENDING.with(|pending| pending.borrow_mut().push_back(context));
    }

    /// Number of contexts waiting for a flush.
    pub fn pending() -> usize {
        PENDING.with(|pending| pending.borrow().len())
    }

    /// Get the context being tracked, if any.
    pub fn current_context() -> Option<Context> {
        Context::current()
    }

    /// Check if we're inside a reactive context.
    pub fn is_tracking() -> bool {
        Context::current().is_some()
    }

    /// Fire the callbacks of every invalidated context until the queue
    /// settles.
    ///
    /// Calling `flush` from inside a callback is an error; the outer flush
    /// already picks up anything queued by that callback.
    pub fn flush() -> Result<FlushReport> {
        if FLUSHING.with(|flushing| flushing.replace(true)) {
            return Err(ReactiveError::ReentrantFlush);
        }
        let _guard = FlushGuard;

        let limit = Self::config().max_flush_passes;
        let mut report = FlushReport::default();

        loop {
            let batch = PENDING.with(|pending| std::mem::take(&mut *pending.borrow_mut()));
            if batch.is_empty() {
                break;
            }

            if report.passes >= limit {
                let remaining = batch.len();
                requeue_front(batch);
                warn!(
                    passes = report.passes,
                    remaining,
                    "flush did not settle, giving up"
                );
                return Err(ReactiveError::FlushLimitExceeded {
                    passes: report.passes,
                });
            }

            report.passes += 1;
            debug!(pass = report.passes, contexts = batch.len(), "flush pass");

            // A panicking callback leaves the rest of the pass queued.
            let mut batch = BatchGuard(batch);
            while let Some(context) = batch.0.pop_front() {
                context.fire();
                report.contexts += 1;
            }
        }

        Ok(report)
    }
}

/// Put `batch` back ahead of anything queued since it was taken.
fn requeue_front(batch: VecDeque<Context>) {
    if batch.is_empty() {
        return;
    }
    PENDING.with(|pending| {
        let mut pending = pending.borrow_mut();
        let newer = std::mem::replace(&mut *pending, batch);
        pending.extend(newer);
    });
}

/// The unprocessed remainder of a pass.
struct BatchGuard(VecDeque<Context>);

impl Drop for BatchGuard {
    fn drop(&mut self) {
        requeue_front(std::mem::take(&mut self.0));
    }
}

/// Clears the flushing flag on every exit path, including unwinding.
struct FlushGuard;

impl Drop for FlushGuard {
    fn drop(&mut self) {
        FLUSHING.with(|flushing| flushing.set(false));
    }
}
