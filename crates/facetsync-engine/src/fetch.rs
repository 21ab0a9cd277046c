//! The fetch collaborator boundary.
//!
//! The engine never executes queries itself; it hands a canonical
//! [`QueryKey`] to a [`QueryFetcher`] and sequences the resulting futures.
//! Async operations are represented as boxed futures so the trait remains
//! dyn-compatible (`Arc<dyn QueryFetcher>`).

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use facetsync_core::pagination::{PageDescriptor, compute_pages};
use facetsync_core::{EngineResult, QueryKey};

/// Boxed future carrying an `EngineResult<T>`.
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = EngineResult<T>> + Send + 'a>>;

/// Executes one query per canonical key.
///
/// # Contract
///
/// - Safely re-invokable with different keys; the engine may issue a new
///   fetch before an older one resolves.
/// - Cancellation support is optional: the engine discards superseded
///   results by generation regardless of whether the transport aborted.
/// - No retry obligations; a failure is surfaced once, as an error value.
pub trait QueryFetcher: Send + Sync {
    /// Execute the query identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`facetsync_core::EngineError::FetchFailed`] (or any other
    /// engine error) when the transport or server fails.
    fn fetch<'a>(&'a self, key: &'a QueryKey) -> FetchFuture<'a, ResultSet>;
}

/// One resolved query: the rows plus enough paging data to render a pager.
///
/// Rows stay opaque JSON — what a row means belongs to the render target,
/// not to the sequencing engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Canonical key this result answers.
    pub key: QueryKey,
    /// Total matching items across all pages.
    pub total_items: u64,
    /// Items per page.
    pub page_size: u32,
    /// The page these rows belong to (1-based).
    pub page: u32,
    /// The rows themselves.
    pub rows: Vec<serde_json::Value>,
}

impl ResultSet {
    /// An empty result for a key (no matches).
    #[must_use]
    pub fn empty(key: QueryKey) -> Self {
        Self {
            key,
            total_items: 0,
            page_size: 0,
            page: 1,
            rows: Vec::new(),
        }
    }

    /// Page buttons for this result, recomputed on every call.
    #[must_use]
    pub fn pager(&self) -> Vec<PageDescriptor> {
        compute_pages(self.total_items, self.page_size, self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facetsync_core::pagination::PageKind;
    use facetsync_core::{FilterState, canonicalize};

    #[test]
    fn empty_result_has_no_pager() {
        let key = canonicalize(&FilterState::new().with_scalar("q", "rust"));
        assert!(ResultSet::empty(key).pager().is_empty());
    }

    #[test]
    fn pager_reflects_paging_fields() {
        let result = ResultSet {
            key: QueryKey::default(),
            total_items: 120,
            page_size: 10,
            page: 4,
            rows: Vec::new(),
        };
        let pager = result.pager();
        assert!(pager.iter().any(|p| p.kind == PageKind::Number && p.page == 12));
    }

    #[test]
    fn fetcher_is_dyn_compatible() {
        struct Always;
        impl QueryFetcher for Always {
            fn fetch<'a>(&'a self, key: &'a QueryKey) -> FetchFuture<'a, ResultSet> {
                Box::pin(async move { Ok(ResultSet::empty(key.clone())) })
            }
        }
        let _fetcher: Box<dyn QueryFetcher> = Box::new(Always);
    }
}
