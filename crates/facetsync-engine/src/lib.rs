//! Query sequencing and view synchronization for faceted listings.
//!
//! This crate turns the facet data model from `facetsync-core` into one
//! authoritative asynchronous query at a time:
//!
//! - [`QueryEngine`] — trailing-edge debounce, a strictly increasing
//!   generation counter, and a staleness guard that makes out-of-order
//!   fetch completions inert,
//! - [`HistorySync`] — two-way, structurally asymmetric binding between
//!   filter states and a navigation backend,
//! - [`ViewSink`] — the idempotent render-target contract,
//! - [`FacetBoard`] — the owning component wiring everything into one
//!   cooperative tokio task.
//!
//! The concurrency hazard this crate addresses is ordering, not shared
//! memory: debounce timers and fetch resolutions complete in arbitrary
//! order, and only the result matching the highest issued generation is
//! ever rendered.

pub mod board;
pub mod config;
pub mod engine;
pub mod fetch;
pub mod history;
pub mod view;

pub use board::{BoardEvent, FacetBoard};
pub use config::{DEFAULT_DEBOUNCE_MS, EngineConfig};
pub use engine::{Dispatch, EngineMetrics, Generation, QueryEngine};
pub use fetch::{FetchFuture, QueryFetcher, ResultSet};
pub use history::{HistoryBackend, HistoryEntry, HistoryStats, HistorySync, PopEvent, SessionHistory};
pub use view::{RecordingView, ViewFrame, ViewSink};
