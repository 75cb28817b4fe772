//! Runtime configuration for the delete shortcut.
//!
//! There is no user-facing settings UI; the browser entry point always runs
//! with [`DeleteConfig::default`]. The builders exist for tests and for
//! embedding the engine against other hosts.

use serde::{Deserialize, Serialize};

use crate::context::{ContextGuard, DEFAULT_HOST, DEFAULT_INBOX_MARKER};
use crate::locator::DEFAULT_MAX_SHADOW_DEPTH;
use crate::result::{DeletudoError, DeletudoResult};
use crate::selector::{SelectorStrategy, DEFAULT_DELETE_SELECTORS};

/// Keys that trigger a delete
pub const DEFAULT_TRIGGER_KEYS: &[&str] = &["Delete", "d"];

/// Default log filter
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration for the delete shortcut
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteConfig {
    /// Webmail hostname
    pub host: String,
    /// Fragment token for the inbox view
    pub inbox_marker: String,
    /// `KeyboardEvent.key` values that trigger a delete
    pub trigger_keys: Vec<String>,
    /// Delete-control patterns in priority order
    pub strategies: Vec<String>,
    /// Shadow nesting limit for the locator
    pub max_shadow_depth: usize,
    /// Log filter directive (`info`, `deletudo=debug`, ...)
    pub log_level: String,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            inbox_marker: DEFAULT_INBOX_MARKER.to_string(),
            trigger_keys: DEFAULT_TRIGGER_KEYS.iter().map(ToString::to_string).collect(),
            strategies: DEFAULT_DELETE_SELECTORS
                .iter()
                .map(ToString::to_string)
                .collect(),
            max_shadow_depth: DEFAULT_MAX_SHADOW_DEPTH,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl DeleteConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the webmail host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the inbox fragment token
    #[must_use]
    pub fn with_inbox_marker(mut self, marker: impl Into<String>) -> Self {
        self.inbox_marker = marker.into();
        self
    }

    /// Replace the trigger keys
    #[must_use]
    pub fn with_trigger_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trigger_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the strategy table
    #[must_use]
    pub fn with_strategies<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strategies = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the shadow nesting limit
    #[must_use]
    pub const fn with_max_shadow_depth(mut self, depth: usize) -> Self {
        self.max_shadow_depth = depth;
        self
    }

    /// Set the log filter
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Check the configuration and build the parsed strategy table
    pub fn validate(&self) -> DeletudoResult<SelectorStrategy> {
        if self.trigger_keys.iter().all(String::is_empty) {
            return Err(DeletudoError::NoTriggerKeys);
        }
        SelectorStrategy::new(&self.strategies)
    }

    /// Context guard for this configuration
    #[must_use]
    pub fn guard(&self) -> ContextGuard {
        ContextGuard::new(self.host.clone(), self.inbox_marker.clone())
    }
}
