//! Two-way binding between filter state and session history.
//!
//! [`HistorySync`] translates in both directions but owns no data: a push
//! turns a [`FilterState`] into a [`HistoryEntry`] (canonical search string
//! for shareable URLs, typed state for fast restoration), and a restore
//! turns a navigation backend's [`PopEvent`] back into a state. The two
//! directions are deliberately asymmetric: [`HistorySync::restore`] takes
//! no backend handle, so a restore structurally cannot create a new
//! history entry — back/forward navigation never grows the stack.

use serde::{Deserialize, Serialize};
use tracing::debug;

use facetsync_core::{EngineError, EngineResult, FilterState, canonicalize};

// ---------------------------------------------------------------------------
// Entries and events
// ---------------------------------------------------------------------------

/// One navigation-stack record.
///
/// `search` exists for shareable URLs; `state` is authoritative for
/// restoration and is never re-derived from the search string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Path component of the entry's URL.
    pub pathname: String,
    /// Canonical query string of the state.
    pub search: String,
    /// The state that produced the rendered view.
    pub state: FilterState,
}

/// A back/forward navigation notification.
///
/// `state` is whatever the backend stored — possibly nothing (first load,
/// or an entry predating this mechanism) and possibly not a valid
/// [`FilterState`] at all, which is why it arrives as raw JSON.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopEvent {
    /// Serialized state attached to the entry, if any.
    pub state: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// The ambient navigation capability.
///
/// The engine treats this as something it uses, not something it owns;
/// [`SessionHistory`] is the in-memory implementation used by tests and
/// headless consumers.
pub trait HistoryBackend {
    /// Append an entry after the current position, discarding any forward
    /// entries.
    fn push_entry(&mut self, entry: HistoryEntry);

    /// The entry at the current position, if any.
    ///
    /// Returned by value: backends are frequently shared with the outside
    /// (the user presses back on the real stack, not on the component's
    /// view of it), so the trait cannot promise a borrow.
    fn current(&self) -> Option<HistoryEntry>;
}

/// In-memory navigation stack with browser push/back/forward semantics.
///
/// State attached to emitted [`PopEvent`]s round-trips through JSON,
/// mirroring the structured-clone boundary real session history imposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl SessionHistory {
    /// An empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Navigate one entry back, emitting the pop event for it.
    ///
    /// Returns `None` at the start of the stack (no navigation happens).
    pub fn back(&mut self) -> Option<PopEvent> {
        if self.cursor == 0 || self.entries.is_empty() {
            return None;
        }
        self.cursor -= 1;
        Some(self.pop_event())
    }

    /// Navigate one entry forward, emitting the pop event for it.
    pub fn forward(&mut self) -> Option<PopEvent> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.pop_event())
    }

    fn pop_event(&self) -> PopEvent {
        PopEvent {
            state: self
                .entries
                .get(self.cursor)
                .and_then(|entry| serde_json::to_value(&entry.state).ok()),
        }
    }
}

impl HistoryBackend for SessionHistory {
    fn push_entry(&mut self, entry: HistoryEntry) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    fn current(&self) -> Option<HistoryEntry> {
        self.entries.get(self.cursor).cloned()
    }
}

/// Shared stack: the component pushes through its handle while the outside
/// drives back/forward through another, the way a real navigation stack is
/// shared between an app and its host.
impl HistoryBackend for std::sync::Arc<std::sync::Mutex<SessionHistory>> {
    fn push_entry(&mut self, entry: HistoryEntry) {
        self.lock().expect("history lock").push_entry(entry);
    }

    fn current(&self) -> Option<HistoryEntry> {
        self.lock().expect("history lock").current()
    }
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// Push/restore statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryStats {
    /// Entries actually pushed.
    pub pushes: u64,
    /// Pushes skipped because the current entry was equivalent.
    pub pushes_skipped: u64,
    /// Restores that fell back to the initial state.
    pub restore_fallbacks: u64,
}

/// Translator between filter states and history entries.
#[derive(Debug, Clone)]
pub struct HistorySync {
    pathname: String,
    initial: FilterState,
    stats: HistoryStats,
}

impl HistorySync {
    /// Bind to a pathname with the component's initial state as the
    /// restoration fallback.
    pub fn new(pathname: impl Into<String>, initial: FilterState) -> Self {
        Self {
            pathname: pathname.into(),
            initial,
            stats: HistoryStats::default(),
        }
    }

    /// Statistics snapshot.
    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        self.stats
    }

    /// Build the entry a state would be stored as.
    #[must_use]
    pub fn entry_for(&self, state: &FilterState) -> HistoryEntry {
        HistoryEntry {
            pathname: self.pathname.clone(),
            search: canonicalize(state).into(),
            state: state.clone(),
        }
    }

    /// Push `state` unless the backend's current entry is equivalent.
    ///
    /// Callers invoke this only for direct user interaction — never from a
    /// pop-event handler. Returns whether an entry was pushed.
    pub fn push<B: HistoryBackend>(&mut self, backend: &mut B, state: &FilterState) -> bool {
        if let Some(current) = backend.current() {
            if current.state.is_equivalent(state) {
                self.stats.pushes_skipped += 1;
                debug!(
                    target: "facetsync",
                    search = %current.search,
                    "skipping equivalent history push"
                );
                return false;
            }
        }
        backend.push_entry(self.entry_for(state));
        self.stats.pushes += 1;
        true
    }

    /// Strictly decode a pop event's state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedHistoryState`] when the event
    /// carries no state or the state fails to deserialize.
    pub fn decode(&self, event: &PopEvent) -> EngineResult<FilterState> {
        let Some(value) = &event.state else {
            return Err(EngineError::MalformedHistoryState {
                detail: "no state attached to the entry".into(),
            });
        };
        serde_json::from_value(value.clone()).map_err(|source| {
            EngineError::MalformedHistoryState {
                detail: source.to_string(),
            }
        })
    }

    /// Restore the state for a pop event, falling back to the initial
    /// state when the event's state is missing or malformed.
    ///
    /// Takes `&mut self` only to count fallbacks; there is no backend
    /// parameter, so a restore can never push.
    pub fn restore(&mut self, event: &PopEvent) -> FilterState {
        match self.decode(event) {
            Ok(state) => state,
            Err(error) => {
                self.stats.restore_fallbacks += 1;
                debug!(
                    target: "facetsync",
                    error = %error,
                    "restoring initial filter state"
                );
                self.initial.clone()
            }
        }
    }
}
