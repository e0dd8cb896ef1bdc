//! Queue configuration and builder.
//!
//! In most cases use [`QueueBuilder`] rather than constructing a
//! [`QueueConfig`] directly.
//!
//! # Configuration Precedence
//!
//! Settings are resolved in this order (highest priority first):
//!
//! 1. **Programmatic** — values set via builder methods (`capacity(16)`)
//! 2. **Environment variables** — values from `HANDOFF_*` env vars
//! 3. **Defaults** — built-in defaults from [`QueueConfig::default()`]
//!
//! # Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `capacity` | 0 (unbounded) |
//! | `name` | `"handoff-queue"` |
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `HANDOFF_QUEUE_CAPACITY` | `usize` | `capacity` (0 = unbounded) |
//! | `HANDOFF_QUEUE_NAME` | `String` | `name` |

use crate::queue::BlockingQueue;

/// Environment variable name for the queue capacity bound.
pub const ENV_QUEUE_CAPACITY: &str = "HANDOFF_QUEUE_CAPACITY";
/// Environment variable name for the queue diagnostic name.
pub const ENV_QUEUE_NAME: &str = "HANDOFF_QUEUE_NAME";

const DEFAULT_QUEUE_NAME: &str = "handoff-queue";

/// Queue configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Capacity bound (0 = unbounded).
    pub capacity: usize,
    /// Diagnostic name carried into lifecycle events.
    pub name: String,
}

impl QueueConfig {
    /// Normalize configuration values to safe defaults.
    pub fn normalize(&mut self) {
        if self.name.is_empty() {
            self.name = DEFAULT_QUEUE_NAME.to_string();
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 0,
            name: DEFAULT_QUEUE_NAME.to_string(),
        }
    }
}

/// Error raised while resolving a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable was set but could not be parsed.
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidEnv {
        /// The offending variable name.
        var: &'static str,
        /// The raw value found in the environment.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Apply environment variable overrides to a [`QueueConfig`].
///
/// Only variables that are set in the environment are applied.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnv`] if a variable is set but contains an
/// unparseable value.
pub fn apply_env_overrides(config: &mut QueueConfig) -> Result<(), ConfigError> {
    if let Some(val) = read_env(ENV_QUEUE_CAPACITY) {
        config.capacity = parse_usize(ENV_QUEUE_CAPACITY, &val)?;
    }
    if let Some(val) = read_env(ENV_QUEUE_NAME) {
        config.name = val;
    }
    Ok(())
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_usize(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    value.parse().map_err(|e| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
        reason: format!("{e}"),
    })
}

/// Builder for [`BlockingQueue`] with environment-aware defaults.
///
/// # Example
///
/// ```
/// use handoff::QueueBuilder;
///
/// let queue = QueueBuilder::new()
///     .capacity(16)
///     .name("ingest")
///     .build::<String>()
///     .expect("config resolved");
/// assert_eq!(queue.capacity(), Some(16));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueueBuilder {
    capacity: Option<usize>,
    name: Option<String>,
}

impl QueueBuilder {
    /// Creates a builder with no programmatic overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the capacity bound; 0 means unbounded.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the diagnostic name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Resolves the configuration and builds the queue.
    ///
    /// Starts from defaults, applies `HANDOFF_*` environment overrides,
    /// then applies the builder's programmatic values on top.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if an environment override is
    /// unparseable.
    pub fn build<T>(&self) -> Result<BlockingQueue<T>, ConfigError> {
        let config = self.resolve()?;
        tracing::debug!(
            queue = %config.name,
            capacity = config.capacity,
            "building queue"
        );
        Ok(BlockingQueue::with_config(config))
    }

    /// Resolves the effective configuration without building a queue.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if an environment override is
    /// unparseable.
    pub fn resolve(&self) -> Result<QueueConfig, ConfigError> {
        let mut config = QueueConfig::default();
        apply_env_overrides(&mut config)?;
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(name) = &self.name {
            config.name.clone_from(name);
        }
        config.normalize();
        Ok(config)
    }
}
