//! The render-target boundary.
//!
//! A [`ViewSink`] is an idempotent projection: rendering the same input
//! twice leaves the same visible state, because a generation-guarded result
//! may legitimately be re-rendered (history restoration replaying an
//! already-rendered state). Sinks never see generations — staleness is
//! decided before a frame reaches them.

use std::sync::{Arc, Mutex};

use facetsync_core::EngineError;

use crate::fetch::ResultSet;

/// Render target consumed by the query engine.
pub trait ViewSink: Send {
    /// Project a resolved result onto the view.
    fn render(&mut self, result: &ResultSet);

    /// Project a fetch failure onto the view. Never called for stale
    /// generations; a discarded result is not an error.
    fn render_error(&mut self, error: &EngineError);
}

/// What a [`RecordingView`] currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewFrame {
    /// A rendered result.
    Result(ResultSet),
    /// A rendered failure message.
    Error(String),
}

/// Reference sink: remembers the visible frame and logs every applied
/// frame for assertions.
///
/// Clones share the same backing store, so a test can keep a handle while
/// the engine owns the sink — the same pattern the mock collaborators in
/// this workspace use everywhere.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    inner: Arc<Mutex<RecordingInner>>,
}

#[derive(Debug, Default)]
struct RecordingInner {
    visible: Option<ViewFrame>,
    log: Vec<ViewFrame>,
}

impl RecordingView {
    /// A fresh view showing nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently visible frame, if any.
    #[must_use]
    pub fn visible(&self) -> Option<ViewFrame> {
        self.inner.lock().expect("view lock").visible.clone()
    }

    /// Every frame ever applied, in order.
    #[must_use]
    pub fn log(&self) -> Vec<ViewFrame> {
        self.inner.lock().expect("view lock").log.clone()
    }

    /// Number of applied frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.inner.lock().expect("view lock").log.len()
    }

    fn apply(&self, frame: ViewFrame) {
        let mut inner = self.inner.lock().expect("view lock");
        inner.visible = Some(frame.clone());
        inner.log.push(frame);
    }
}

impl ViewSink for RecordingView {
    fn render(&mut self, result: &ResultSet) {
        self.apply(ViewFrame::Result(result.clone()));
    }

    fn render_error(&mut self, error: &EngineError) {
        self.apply(ViewFrame::Error(error.to_string()));
    }
}
