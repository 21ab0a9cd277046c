//! The query sequencing engine.
//!
//! [`QueryEngine`] turns a stream of filter-state changes into exactly one
//! authoritative fetch at a time:
//!
//! - changes are canonicalized and compared against the last *dispatched*
//!   key, so equivalent states never re-fetch,
//! - a trailing-edge debounce window coalesces bursts; the generation
//!   counter advances only when the window actually closes,
//! - results are accepted only when their generation equals the latest
//!   issued one — last write wins by issuance order, not completion order.
//!
//! The engine core is a deterministic state machine: every operation takes
//! an explicit `Instant`, so there is no hidden clock and ordering tests
//! need no sleeps. The async shell ([`crate::board::FacetBoard`]) supplies
//! real time and executes dispatches.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use facetsync_core::{EngineResult, FilterState, QueryKey, canonicalize};

use crate::config::EngineConfig;
use crate::fetch::ResultSet;
use crate::view::ViewSink;

// ---------------------------------------------------------------------------
// Generations
// ---------------------------------------------------------------------------

/// Strictly increasing fetch sequence number, owned by one engine instance.
///
/// Distinguishes issuance order from completion order: at most one
/// generation — the latest issued — is ever "current".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// The raw counter value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One fetch the shell must execute: the key to query and the generation
/// its result must carry back into [`QueryEngine::on_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Generation issued for this fetch.
    pub generation: Generation,
    /// Canonical key to fetch.
    pub key: QueryKey,
}

/// Counter snapshot for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineMetrics {
    /// Filter states submitted.
    pub states_seen: u64,
    /// Debounce windows that closed into a fetch.
    pub dispatches: u64,
    /// Results forwarded to the view.
    pub results_accepted: u64,
    /// Results discarded by the generation guard.
    pub stale_discarded: u64,
    /// Fetch failures forwarded to the view.
    pub errors_rendered: u64,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Debounced, generation-guarded query sequencer.
///
/// Owns the view sink and its own generation counter; holds only derived
/// keys, never the filter state itself (that stays with the owning
/// component).
#[derive(Debug)]
pub struct QueryEngine<V: ViewSink> {
    view: V,
    config: EngineConfig,
    generation: u64,
    last_dispatched: Option<QueryKey>,
    pending: Option<QueryKey>,
    deadline: Option<Instant>,
    metrics: EngineMetrics,
}

impl<V: ViewSink> QueryEngine<V> {
    /// Create an engine over a view sink.
    ///
    /// # Errors
    ///
    /// Returns [`facetsync_core::EngineError::InvalidConfig`] when the
    /// config is rejected by [`EngineConfig::validate`].
    pub fn new(view: V, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            view,
            config,
            generation: 0,
            last_dispatched: None,
            pending: None,
            deadline: None,
            metrics: EngineMetrics::default(),
        })
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Latest issued generation (zero before the first dispatch).
    #[must_use]
    pub fn current_generation(&self) -> Generation {
        Generation(self.generation)
    }

    /// Counter snapshot.
    #[must_use]
    pub fn metrics(&self) -> EngineMetrics {
        self.metrics
    }

    /// Read access to the view sink.
    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    /// When the pending debounce window closes, if one is armed.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Submit the next filter state.
    ///
    /// Canonicalizes and compares against the last dispatched key. A key
    /// equal to the last dispatch cancels any pending dispatch (the state
    /// returned to what is already shown); any other key (re)arms the
    /// trailing-edge deadline at `now + debounce`. The generation counter
    /// is *not* touched here — only [`Self::fire`] advances it.
    ///
    /// Returns the armed deadline, or `None` when nothing is pending.
    pub fn set_filter_state(&mut self, state: &FilterState, now: Instant) -> Option<Instant> {
        self.metrics.states_seen += 1;
        let key = canonicalize(state);

        if self.last_dispatched.as_ref() == Some(&key) {
            if self.pending.take().is_some() {
                self.deadline = None;
                debug!(
                    target: "facetsync",
                    query_key = %key,
                    "state returned to last dispatched key; pending dispatch cancelled"
                );
            }
            return None;
        }

        let deadline = now + self.config.debounce();
        self.pending = Some(key);
        self.deadline = Some(deadline);
        self.deadline
    }

    /// Close the debounce window if it is due.
    ///
    /// Increments the generation and records the dispatched key only when
    /// a pending key exists and `now` has reached the deadline. The caller
    /// executes the returned [`Dispatch`] and reports back through
    /// [`Self::on_result`].
    pub fn fire(&mut self, now: Instant) -> Option<Dispatch> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        let key = self.pending.take()?;
        self.deadline = None;
        self.generation += 1;
        self.metrics.dispatches += 1;
        self.last_dispatched = Some(key.clone());
        debug!(
            target: "facetsync",
            generation = self.generation,
            query_key = %key,
            "debounce window closed; dispatching fetch"
        );
        Some(Dispatch {
            generation: Generation(self.generation),
            key,
        })
    }

    /// Accept or discard a fetch resolution.
    ///
    /// A generation other than the latest issued one is discarded silently
    /// (debug trace only — a stale result is not an error). The current
    /// generation's outcome is forwarded to the view: `Ok` to
    /// [`ViewSink::render`], `Err` to [`ViewSink::render_error`].
    ///
    /// Returns whether the outcome was forwarded.
    pub fn on_result(
        &mut self,
        generation: Generation,
        outcome: EngineResult<ResultSet>,
    ) -> bool {
        if generation.0 != self.generation {
            self.metrics.stale_discarded += 1;
            debug!(
                target: "facetsync",
                generation = generation.0,
                current = self.generation,
                stale_discards = self.metrics.stale_discarded,
                "discarding out-of-generation result"
            );
            return false;
        }
        match outcome {
            Ok(result) => {
                self.metrics.results_accepted += 1;
                debug!(
                    target: "facetsync",
                    generation = generation.0,
                    query_key = %result.key,
                    total_items = result.total_items,
                    "rendering result"
                );
                self.view.render(&result);
            }
            Err(error) => {
                self.metrics.errors_rendered += 1;
                warn!(
                    target: "facetsync",
                    generation = generation.0,
                    error = %error,
                    "rendering fetch failure"
                );
                self.view.render_error(&error);
            }
        }
        true
    }
}
