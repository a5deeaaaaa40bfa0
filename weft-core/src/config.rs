//! Runtime Configuration
//!
//! Knobs for the scheduler and the reactive wrappers. Configuration is
//! per-thread, like the rest of the runtime state: install it once at
//! startup with [`install`], read it with [`current`].
//!
//! ```rust,ignore
//! let config = RuntimeConfig::from_json(r#"{ "scheduler": { "recursion_limit": 32 } }"#)?;
//! weft_core::config::install(config);
//! ```

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of times a single job may run within one flush.
pub const DEFAULT_RECURSION_LIMIT: usize = 100;

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub scheduler: SchedulerConfig,
    pub reactive: ReactiveConfig,
}

/// Job scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How many times the same job may run during one flush before it is
    /// dropped with an error. Guards against render loops where a job keeps
    /// re-queueing itself.
    pub recursion_limit: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

/// Reactive wrapper settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactiveConfig {
    /// Emit a warning when a write hits a read-only wrapper.
    pub warn_readonly_writes: bool,
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self {
            warn_readonly_writes: true,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.recursion_limit == 0 {
            return Err(ConfigError::ZeroRecursionLimit);
        }
        Ok(())
    }
}

thread_local! {
    static CURRENT: RefCell<RuntimeConfig> = RefCell::new(RuntimeConfig::default());
}

/// Install a configuration for the current thread.
pub fn install(config: RuntimeConfig) {
    tracing::debug!(?config, "installing runtime configuration");
    CURRENT.with(|current| *current.borrow_mut() = config);
}

/// A copy of the configuration active on the current thread.
pub fn current() -> RuntimeConfig {
    CURRENT.with(|current| current.borrow().clone())
}

pub(crate) fn recursion_limit() -> usize {
    CURRENT.with(|current| current.borrow().scheduler.recursion_limit)
}

pub(crate) fn warn_readonly_writes() -> bool {
    CURRENT.with(|current| current.borrow().reactive.warn_readonly_writes)
}
