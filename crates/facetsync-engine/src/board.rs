//! The owning component: facet widgets on one side, collaborators on the
//! other.
//!
//! [`FacetBoard`] holds the authoritative [`FilterState`], folds facet
//! events into new snapshots, and wires the engine, fetcher, view, and
//! history together. [`FacetBoard::run`] is the async shell: a single task
//! multiplexing the inbound event channel, the debounce deadline, and
//! fetch completions — the engine core itself never touches a clock or a
//! runtime.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, warn};

use facetsync_core::{EngineResult, FacetChange, FilterState};

use crate::config::EngineConfig;
use crate::engine::{Dispatch, EngineMetrics, Generation, QueryEngine};
use crate::fetch::{QueryFetcher, ResultSet};
use crate::history::{HistoryBackend, HistoryStats, HistorySync, PopEvent};
use crate::view::ViewSink;

/// Inputs a board reacts to.
#[derive(Debug, Clone)]
pub enum BoardEvent {
    /// A facet widget changed one facet (direct user interaction).
    Facet(FacetChange),
    /// The navigation backend moved to another entry (back/forward).
    Navigation(PopEvent),
}

/// Owning component for one faceted listing.
pub struct FacetBoard<F, V, B>
where
    F: QueryFetcher + 'static,
    V: ViewSink,
    B: HistoryBackend,
{
    state: FilterState,
    engine: QueryEngine<V>,
    fetcher: Arc<F>,
    history: HistorySync,
    backend: B,
}

impl<F, V, B> FacetBoard<F, V, B>
where
    F: QueryFetcher + 'static,
    V: ViewSink,
    B: HistoryBackend,
{
    /// Assemble a board from its collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`facetsync_core::EngineError::InvalidConfig`] when the
    /// engine config is invalid.
    pub fn new(
        pathname: impl Into<String>,
        initial: FilterState,
        fetcher: Arc<F>,
        view: V,
        backend: B,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        let engine = QueryEngine::new(view, config)?;
        let history = HistorySync::new(pathname, initial.clone());
        Ok(Self {
            state: initial,
            engine,
            fetcher,
            history,
            backend,
        })
    }

    /// The current filter state.
    #[must_use]
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Engine counter snapshot.
    #[must_use]
    pub fn engine_metrics(&self) -> EngineMetrics {
        self.engine.metrics()
    }

    /// History push/restore statistics.
    #[must_use]
    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats()
    }

    /// Read access to the navigation backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the navigation backend (for driving back/forward
    /// from the outside, the way a user would).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Fold one event into the next state and (re)arm the engine.
    ///
    /// Facet events push a history entry (skipped when equivalent);
    /// navigation events restore without pushing — that asymmetry is what
    /// keeps the back button from manufacturing forward entries.
    pub fn handle(&mut self, event: BoardEvent, now: Instant) -> Option<Instant> {
        match event {
            BoardEvent::Facet(change) => {
                let next = self.state.apply(&change);
                let deadline = self.engine.set_filter_state(&next, now);
                self.history.push(&mut self.backend, &next);
                self.state = next;
                deadline
            }
            BoardEvent::Navigation(event) => {
                let restored = self.history.restore(&event);
                debug!(
                    target: "facetsync",
                    facet_count = restored.normalized().len(),
                    "navigation event restored filter state"
                );
                let deadline = self.engine.set_filter_state(&restored, now);
                self.state = restored;
                deadline
            }
        }
    }

    /// Drive the board until the event channel closes.
    ///
    /// One cooperative loop over three suspension points: inbound events,
    /// the debounce deadline, and fetch completions. On channel close any
    /// pending dispatch is flushed and in-flight fetches are drained, so
    /// the final state always reaches the view. Returns the board for
    /// post-run inspection.
    pub async fn run(mut self, mut events: mpsc::Receiver<BoardEvent>) -> Self {
        let mut inflight: JoinSet<(Generation, EngineResult<ResultSet>)> = JoinSet::new();
        let mut superseded: Vec<AbortHandle> = Vec::new();

        loop {
            let deadline = self.engine.deadline();
            let wake = deadline.map_or_else(
                || tokio::time::Instant::now() + IDLE_PARK,
                tokio::time::Instant::from_std,
            );

            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    self.handle(event, tokio::time::Instant::now().into_std());
                }
                () = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    self.dispatch_due(&mut inflight, &mut superseded);
                }
                Some(joined) = inflight.join_next(), if !inflight.is_empty() => {
                    Self::settle(&mut self.engine, joined);
                }
            }
        }

        // Channel closed: flush the pending window, then drain fetches.
        if let Some(deadline) = self.engine.deadline() {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
            self.dispatch_due(&mut inflight, &mut superseded);
        }
        while let Some(joined) = inflight.join_next().await {
            Self::settle(&mut self.engine, joined);
        }
        self
    }

    /// Fire the engine if its window is due and execute the dispatch.
    fn dispatch_due(
        &mut self,
        inflight: &mut JoinSet<(Generation, EngineResult<ResultSet>)>,
        superseded: &mut Vec<AbortHandle>,
    ) {
        let now = tokio::time::Instant::now().into_std();
        let Some(Dispatch { generation, key }) = self.engine.fire(now) else {
            return;
        };

        // Everything still in flight is now stale. The generation guard
        // makes their results inert either way; aborting just stops the
        // wasted work when the config allows it.
        if self.engine.config().abort_superseded {
            for handle in superseded.drain(..) {
                handle.abort();
            }
        } else {
            superseded.clear();
        }

        let fetcher = Arc::clone(&self.fetcher);
        let handle = inflight.spawn(async move {
            let outcome = fetcher.fetch(&key).await;
            (generation, outcome)
        });
        superseded.push(handle);
    }

    fn settle(
        engine: &mut QueryEngine<V>,
        joined: Result<(Generation, EngineResult<ResultSet>), tokio::task::JoinError>,
    ) {
        match joined {
            Ok((generation, outcome)) => {
                engine.on_result(generation, outcome);
            }
            Err(join_error) if join_error.is_cancelled() => {
                // A superseded fetch whose transport-level abort landed.
            }
            Err(join_error) => {
                warn!(
                    target: "facetsync",
                    error = %join_error,
                    "fetch task failed to join"
                );
            }
        }
    }
}

/// Sleep horizon used when no deadline is armed; the branch is disabled
/// then, this only keeps `sleep_until` constructible.
const IDLE_PARK: std::time::Duration = std::time::Duration::from_secs(3600);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SessionHistory;
    use crate::view::RecordingView;
    use facetsync_core::{FacetValue, QueryKey, canonicalize};

    use crate::fetch::FetchFuture;

    struct EchoFetcher;

    impl QueryFetcher for EchoFetcher {
        fn fetch<'a>(&'a self, key: &'a QueryKey) -> FetchFuture<'a, ResultSet> {
            Box::pin(async move { Ok(ResultSet::empty(key.clone())) })
        }
    }

    fn board() -> FacetBoard<EchoFetcher, RecordingView, SessionHistory> {
        FacetBoard::new(
            "/students",
            FilterState::new(),
            Arc::new(EchoFetcher),
            RecordingView::new(),
            SessionHistory::new(),
            EngineConfig::default(),
        )
        .expect("board")
    }

    fn facet(q: &str) -> BoardEvent {
        BoardEvent::Facet(FacetChange::new("q", FacetValue::scalar(q)))
    }

    #[test]
    fn facet_event_folds_state_and_pushes_history() {
        let mut board = board();
        let deadline = board.handle(facet("rust"), Instant::now());
        assert!(deadline.is_some());
        assert!(
            board
                .state()
                .is_equivalent(&FilterState::new().with_scalar("q", "rust"))
        );
        assert_eq!(board.backend().len(), 1);
        assert_eq!(board.history_stats().pushes, 1);
    }

    #[test]
    fn navigation_event_restores_without_pushing() {
        let mut board = board();
        let now = Instant::now();
        board.handle(facet("a"), now);
        board.handle(facet("b"), now);
        assert_eq!(board.backend().len(), 2);

        let event = board.backend_mut().back().expect("back");
        board.handle(BoardEvent::Navigation(event), now);
        assert!(
            board
                .state()
                .is_equivalent(&FilterState::new().with_scalar("q", "a"))
        );
        // The restore must not have created a new entry.
        assert_eq!(board.backend().len(), 2);
        assert_eq!(board.history_stats().pushes, 2);
    }

    #[test]
    fn redundant_facet_event_skips_history_push() {
        let mut board = board();
        let now = Instant::now();
        board.handle(facet("a"), now);
        // Same equivalence class again.
        board.handle(
            BoardEvent::Facet(FacetChange::new("q", FacetValue::multi(["a"]))),
            now,
        );
        assert_eq!(board.backend().len(), 1);
        assert_eq!(board.history_stats().pushes_skipped, 1);
    }

    #[test]
    fn navigation_restore_arms_a_refetch() {
        let mut board = board();
        let now = Instant::now();
        board.handle(facet("a"), now);
        board.handle(facet("b"), now);
        let event = board.backend_mut().back().expect("back");
        let deadline = board.handle(BoardEvent::Navigation(event), now);
        // "a" differs from the last dispatched key (none yet dispatched),
        // so a window is armed.
        assert!(deadline.is_some());
    }

    #[test]
    fn history_entry_search_matches_canonical_key() {
        let mut board = board();
        board.handle(facet("rust"), Instant::now());
        let entry = board.backend().current().expect("entry");
        assert_eq!(
            entry.search,
            canonicalize(&FilterState::new().with_scalar("q", "rust")).as_str()
        );
        assert_eq!(entry.pathname, "/students");
    }
}
