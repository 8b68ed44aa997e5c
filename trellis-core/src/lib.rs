//! Trellis Core
//!
//! This crate provides fine-grained reactive state on top of a small
//! dependency-tracking runtime. It implements:
//!
//! - Contexts and a batched flush loop
//! - Reactive variables with per-value equality subscriptions
//! - Combinators: `repeat`, `isolate`, `wait_until` and `memoize`
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Contexts, the runtime, reactive variables and combinators
//! - `config`: Runtime configuration
//! - `error`: Errors reported by the runtime
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_core::reactive::{memoize, repeat, ReactiveVariable, Runtime};
//!
//! // Create a variable
//! let count = ReactiveVariable::new(0);
//!
//! // Create a shared derived value
//! let doubled = memoize({
//!     let count = count.clone();
//!     move || count.read() * 2
//! });
//!
//! // Create a loop that re-runs when its inputs change
//! repeat(move || println!("Doubled: {}", doubled.get()));
//!
//! // Update the variable, then let the runtime catch up
//! count.set(5);
//! Runtime::flush()?;
//! // Prints: "Doubled: 10"
//! ```

pub mod reactive;
pub mod config;
pub mod error;

pub use config::RuntimeConfig;
pub use error::{ReactiveError, Result};
pub use reactive::Runtime;
