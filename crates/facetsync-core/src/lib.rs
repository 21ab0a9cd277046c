//! Core types and pure algorithms for the facetsync engine.
//!
//! This crate defines the facet data model ([`FilterState`]), the
//! canonical query-string mapping ([`canonical::canonicalize`] /
//! [`canonical::parse`]), the year/term fallback resolver
//! ([`term::TermCatalog`]), the pagination model
//! ([`pagination::compute_pages`]), and the unified error type
//! ([`EngineError`]). It has minimal external dependencies and is intended
//! to be depended on by every other crate in the workspace.

pub mod canonical;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod term;
pub mod tracing_config;

pub use canonical::{QueryKey, canonicalize, parse};
pub use error::{EngineError, EngineResult};
pub use filter::{FacetChange, FacetValue, FilterState};
pub use pagination::{PageDescriptor, PageKind, compute_pages};
pub use term::{SPRING_TERM, TermCatalog, TermResolution, term_slug};
