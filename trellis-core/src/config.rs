//! Runtime Configuration
//!
//! Settings for the thread-local reactive runtime. A configuration can be
//! built in code or parsed from JSON; fields left out of the JSON keep their
//! defaults.
//!
//! ```rust,ignore
//! use trellis_core::{Runtime, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_json(r#"{ "max_flush_passes": 64 }"#)?;
//! Runtime::configure(config);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default upper bound on passes in a single flush.
pub const DEFAULT_MAX_FLUSH_PASSES: usize = 10_000;

/// Configuration for the reactive runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum number of passes a flush makes before giving up.
    ///
    /// A computation that invalidates itself on every run would otherwise
    /// keep the flush loop going forever.
    pub max_flush_passes: usize,
}

impl RuntimeConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the configuration as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_flush_passes: DEFAULT_MAX_FLUSH_PASSES,
        }
    }
}
