//! Engine configuration.
//!
//! All fields have sensible defaults. Override selectively via the
//! builder methods or environment variables.
//!
//! # Environment Variable Overrides
//!
//! | Variable                      | Field              | Default |
//! |-------------------------------|--------------------|---------|
//! | `FACETSYNC_DEBOUNCE_MS`       | `debounce_ms`      | `200`   |
//! | `FACETSYNC_ABORT_SUPERSEDED`  | `abort_superseded` | `true`  |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use facetsync_core::{EngineError, EngineResult};

/// Default trailing-edge debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Tuning knobs for the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Trailing-edge debounce window in milliseconds; every filter-state
    /// change within the window resets it. Default: 200.
    pub debounce_ms: u64,

    /// Best-effort transport-level abort of superseded in-flight fetches.
    /// The generation guard discards their results either way; this only
    /// saves wasted work. Default: true.
    pub abort_superseded: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            abort_superseded: true,
        }
    }
}

impl EngineConfig {
    /// Defaults with environment overrides applied.
    ///
    /// Unparseable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = std::env::var("FACETSYNC_DEBOUNCE_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
        {
            config.debounce_ms = ms;
        }
        if let Some(flag) = std::env::var("FACETSYNC_ABORT_SUPERSEDED")
            .ok()
            .and_then(|raw| raw.parse().ok())
        {
            config.abort_superseded = flag;
        }
        config
    }

    /// Builder-style debounce override.
    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Builder-style abort-policy override.
    #[must_use]
    pub fn with_abort_superseded(mut self, abort_superseded: bool) -> Self {
        self.abort_superseded = abort_superseded;
        self
    }

    /// The debounce window as a [`Duration`].
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Reject configurations the engine cannot honor.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] when the debounce window is
    /// zero (a zero window turns every keystroke into a dispatch, which is
    /// exactly the behavior this engine exists to prevent).
    pub fn validate(&self) -> EngineResult<()> {
        if self.debounce_ms == 0 {
            return Err(EngineError::InvalidConfig {
                field: "debounce_ms".into(),
                value: "0".into(),
                reason: "debounce window must be at least 1ms".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.debounce_ms, 200);
        assert!(config.abort_superseded);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_debounce_is_rejected() {
        let err = EngineConfig::default()
            .with_debounce_ms(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { .. }));
    }

    #[test]
    fn builders_override_fields() {
        let config = EngineConfig::default()
            .with_debounce_ms(50)
            .with_abort_superseded(false);
        assert_eq!(config.debounce(), Duration::from_millis(50));
        assert!(!config.abort_superseded);
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let config: EngineConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(config, EngineConfig::default());
    }
}
