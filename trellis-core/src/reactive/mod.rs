//! Reactive Primitives
//!
//! This module implements reactive variables and the combinators built on
//! top of them.
//!
//! # Concepts
//!
//! ## Contexts
//!
//! A [`Context`] is one run of a reactive computation. Reactive values read
//! while a context is current register it as a dependent, and invalidate it
//! when they change. An invalidated context is never re-run; its callbacks
//! fire on the next [`Runtime::flush`] and decide what happens next.
//!
//! ## Reactive Variables
//!
//! A [`ReactiveVariable`] is a container for mutable state. It can be read,
//! which depends on every change, or tested for equality against a value,
//! which only depends on changes into or out of that value.
//!
//! ## Combinators
//!
//! - [`repeat`] keeps a computation up to date by re-running it after each
//!   invalidation.
//! - [`isolate`] runs a computation without attributing its reads to the
//!   caller.
//! - [`wait_until`] runs a callback the first time a reactive test passes.
//! - [`memoize`] shares one evaluation of a computation among many readers.
//!
//! # Implementation Notes
//!
//! The currently running context lives on a thread-local stack, and the
//! queue of invalidated contexts is thread-local as well. Everything here is
//! single-threaded and `!Send`.

mod context;
mod runtime;
mod subscriber;
mod partition;
mod variable;
mod scope;
mod repeat;
mod isolate;
mod wait;
mod memo;

pub use context::{Context, ContextId};
pub use runtime::{FlushReport, Runtime};
pub use subscriber::SubscriberSet;
pub use partition::EqualityPartition;
pub use variable::ReactiveVariable;
pub use scope::VariableScope;
pub use repeat::{repeat, Repeat};
pub use isolate::isolate;
pub use wait::{wait_until, Watch, WatchState};
pub use memo::{memoize, Memo};
