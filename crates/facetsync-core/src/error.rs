/// Unified error type covering all failure modes across the facetsync pipeline.
///
/// Every variant includes an actionable message guiding the consumer toward
/// resolution. Stale fetch results are deliberately *not* represented here:
/// a superseded response is discarded silently by the engine's generation
/// guard and never surfaces as an error. Only `FetchFailed` and
/// `UnresolvableTerm` cross into user-visible territory; `MalformedHistoryState`
/// is recovered locally by falling back to the initial filter state.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The fetch collaborator reported a transport or server failure.
    ///
    /// Forwarded to the view's error renderer (subject to the staleness
    /// check); the engine never retries on its own.
    #[error("Fetch failed for \"{key}\": {detail}. Retry policy belongs to the fetch collaborator.")]
    FetchFailed {
        /// Canonical query string of the failed fetch.
        key: String,
        /// What the transport reported.
        detail: String,
    },

    /// No term exists for the requested academic year.
    ///
    /// Surfaced as an explicit value instead of guessing a slug; the
    /// resolver never loops past a single fallback step.
    #[error("No terms are available for year {year}. Register the year in the TermCatalog first.")]
    UnresolvableTerm {
        /// The year that has no term entries.
        year: i32,
    },

    /// A navigation event carried state that is missing or failed to parse.
    ///
    /// Recovered locally: `HistorySync::restore` falls back to the initial
    /// filter state instead of propagating this.
    #[error("History state is missing or malformed: {detail}. Falling back to the initial filter state.")]
    MalformedHistoryState {
        /// Why the state could not be decoded.
        detail: String,
    },

    /// An engine configuration value is out of range.
    #[error("Invalid config: {field} = {value}: {reason}")]
    InvalidConfig {
        /// Which field was rejected.
        field: String,
        /// The offending value, stringified.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Convenience alias used throughout facetsync.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failed_message_names_the_key() {
        let err = EngineError::FetchFailed {
            key: "q=rust".into(),
            detail: "HTTP 502".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("q=rust"));
        assert!(msg.contains("502"));
    }

    #[test]
    fn unresolvable_term_message_names_the_year() {
        let err = EngineError::UnresolvableTerm { year: 2031 };
        assert!(err.to_string().contains("2031"));
    }

    #[test]
    fn invalid_config_message_has_field_and_reason() {
        let err = EngineError::InvalidConfig {
            field: "debounce_ms".into(),
            value: "0".into(),
            reason: "must be > 0".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("debounce_ms"));
        assert!(msg.contains("must be > 0"));
    }

    #[test]
    fn errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }
}
