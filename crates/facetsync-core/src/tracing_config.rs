//! Tracing conventions for facetsync.
//!
//! Consumers bring their own subscriber; this module only fixes the names
//! used by facetsync spans and events so they can be filtered and matched
//! in subscribers, dashboards, and tests.
//!
//! ```text
//! RUST_LOG=facetsync=debug
//! ```

use tracing::Level;

/// Target prefix used by all facetsync tracing spans and events.
pub const TARGET_PREFIX: &str = "facetsync";

/// Standard tracing span names used across the engine.
pub mod span_names {
    /// A debounce window closing into a dispatched fetch.
    pub const DISPATCH: &str = "facetsync::dispatch";
    /// One fetch issued to the collaborator.
    pub const FETCH: &str = "facetsync::fetch";
    /// A result or error projected onto the view.
    pub const RENDER: &str = "facetsync::render";
    /// A navigation event restored into a filter state.
    pub const RESTORE: &str = "facetsync::restore";
}

/// Standard structured field names used in tracing events.
pub mod field_names {
    pub const GENERATION: &str = "generation";
    pub const QUERY_KEY: &str = "query_key";
    pub const FACET_COUNT: &str = "facet_count";
    pub const TOTAL_ITEMS: &str = "total_items";
    pub const STALE_DISCARDS: &str = "stale_discards";
}

/// Parse a log level string (case-insensitive).
///
/// Recognized values: `trace`, `debug`, `info`, `warn`, `error`.
/// Returns `None` for unrecognized strings.
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Returns the recommended `tracing::Level` for the given environment.
///
/// Checks `FACETSYNC_LOG_LEVEL` first, then falls back to the provided
/// default.
#[must_use]
pub fn level_from_env(default: Level) -> Level {
    std::env::var("FACETSYNC_LOG_LEVEL")
        .ok()
        .and_then(|s| parse_level(&s))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_names_carry_the_target_prefix() {
        assert!(span_names::DISPATCH.starts_with("facetsync::"));
        assert!(span_names::FETCH.starts_with("facetsync::"));
        assert!(span_names::RENDER.starts_with("facetsync::"));
        assert!(span_names::RESTORE.starts_with("facetsync::"));
    }

    #[test]
    fn parse_level_recognizes_all_levels() {
        assert_eq!(parse_level("TRACE"), Some(Level::TRACE));
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level("Info"), Some(Level::INFO));
        assert_eq!(parse_level("warn"), Some(Level::WARN));
        assert_eq!(parse_level("error"), Some(Level::ERROR));
        assert_eq!(parse_level("loud"), None);
    }
}
