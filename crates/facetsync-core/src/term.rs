//! Year/term fallback resolution for course-offering and campaign facets.
//!
//! A term slug is `"{year}-{term}"`, except that spring belongs to the
//! *next* calendar year: spring of academic year 2020 is `2021-spring`.
//! When a requested `(year, term)` pair does not exist in the catalog, the
//! resolver falls back to the last entry of that year's term list (lists
//! are stored most-recent-first) and reapplies the spring rule. Resolution
//! terminates in at most one fallback step; a year with no terms at all is
//! an explicit error, never a guess.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Term whose slug is attributed to the following calendar year.
pub const SPRING_TERM: &str = "spring";

/// Compute the slug for a `(year, term)` pair.
///
/// ```
/// use facetsync_core::term::term_slug;
///
/// assert_eq!(term_slug(2020, "autumn"), "2020-autumn");
/// assert_eq!(term_slug(2020, "spring"), "2021-spring");
/// ```
#[must_use]
pub fn term_slug(year: i32, term: &str) -> String {
    let term = term.to_ascii_lowercase();
    let slug_year = if term == SPRING_TERM { year + 1 } else { year };
    format!("{slug_year}-{term}")
}

/// Terminal outcome of a term resolution.
///
/// Both variants carry the resolved slug; [`TermResolution::slug`] is the
/// terminal value callers act on, the variant records whether a fallback
/// step was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermResolution {
    /// The requested pair exists as-is.
    Available {
        /// Resolved slug.
        slug: String,
    },
    /// The requested term was unavailable; the year's last listed term was
    /// substituted.
    FallbackResolved {
        /// The requested year.
        year: i32,
        /// The term actually used.
        term: String,
        /// Resolved slug.
        slug: String,
    },
}

impl TermResolution {
    /// The resolved slug, regardless of how it was reached.
    #[must_use]
    pub fn slug(&self) -> &str {
        match self {
            Self::Available { slug } | Self::FallbackResolved { slug, .. } => slug,
        }
    }

    /// Whether a fallback step was taken.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::FallbackResolved { .. })
    }
}

/// Known term availability, keyed by academic year.
///
/// Term lists are stored most-recent-first; the fallback rule picks the
/// final entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermCatalog {
    years: BTreeMap<i32, Vec<String>>,
}

impl TermCatalog {
    /// An empty catalog (every resolution fails).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style year registration. Terms are lowercased on entry.
    #[must_use]
    pub fn with_year<I, S>(mut self, year: i32, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.years.insert(
            year,
            terms
                .into_iter()
                .map(|term| term.into().to_ascii_lowercase())
                .collect(),
        );
        self
    }

    /// The ordered term list for a year, if any.
    #[must_use]
    pub fn terms_for(&self, year: i32) -> Option<&[String]> {
        self.years.get(&year).map(Vec::as_slice)
    }

    /// Resolve `(year, term)` to an available slug.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnresolvableTerm`] when the year is unknown
    /// or has an empty term list.
    pub fn resolve(&self, year: i32, term: &str) -> EngineResult<TermResolution> {
        let terms = self
            .years
            .get(&year)
            .filter(|terms| !terms.is_empty())
            .ok_or(EngineError::UnresolvableTerm { year })?;

        let requested = term.to_ascii_lowercase();
        if terms.iter().any(|known| *known == requested) {
            return Ok(TermResolution::Available {
                slug: term_slug(year, &requested),
            });
        }

        let Some(fallback) = terms.last() else {
            return Err(EngineError::UnresolvableTerm { year });
        };
        Ok(TermResolution::FallbackResolved {
            year,
            term: fallback.clone(),
            slug: term_slug(year, fallback),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TermCatalog {
        TermCatalog::new()
            .with_year(2020, ["autumn", "spring"])
            .with_year(2021, ["winter", "autumn"])
    }

    #[test]
    fn spring_slug_belongs_to_next_year() {
        assert_eq!(term_slug(2020, "spring"), "2021-spring");
        assert_eq!(term_slug(2020, "Spring"), "2021-spring");
    }

    #[test]
    fn non_spring_slug_keeps_year() {
        assert_eq!(term_slug(2021, "winter"), "2021-winter");
    }

    #[test]
    fn requested_spring_resolves_directly() {
        let resolution = catalog().resolve(2020, "spring").expect("resolve");
        assert_eq!(
            resolution,
            TermResolution::Available {
                slug: "2021-spring".into()
            }
        );
        assert!(!resolution.is_fallback());
    }

    #[test]
    fn missing_term_falls_back_to_last_listed() {
        // "summer" is not offered in 2020; the last listed term is spring,
        // so the spring year-increment rule applies to the fallback too.
        let resolution = catalog().resolve(2020, "summer").expect("resolve");
        assert_eq!(
            resolution,
            TermResolution::FallbackResolved {
                year: 2020,
                term: "spring".into(),
                slug: "2021-spring".into(),
            }
        );
        assert!(resolution.is_fallback());
        assert_eq!(resolution.slug(), "2021-spring");
    }

    #[test]
    fn fallback_without_spring_keeps_year() {
        let resolution = catalog().resolve(2021, "spring").expect("resolve");
        assert_eq!(resolution.slug(), "2021-autumn");
        assert!(resolution.is_fallback());
    }

    #[test]
    fn unknown_year_is_an_explicit_error() {
        let err = catalog().resolve(1999, "spring").unwrap_err();
        assert!(matches!(err, EngineError::UnresolvableTerm { year: 1999 }));
    }

    #[test]
    fn empty_term_list_is_an_explicit_error() {
        let empty = TermCatalog::new().with_year(2024, Vec::<String>::new());
        let err = empty.resolve(2024, "autumn").unwrap_err();
        assert!(matches!(err, EngineError::UnresolvableTerm { year: 2024 }));
    }

    #[test]
    fn request_is_case_insensitive() {
        let resolution = catalog().resolve(2020, "AUTUMN").expect("resolve");
        assert_eq!(resolution.slug(), "2020-autumn");
        assert!(!resolution.is_fallback());
    }

    #[test]
    fn resolution_serde_roundtrip() {
        let resolution = catalog().resolve(2020, "summer").expect("resolve");
        let json = serde_json::to_string(&resolution).expect("serialize");
        let back: TermResolution = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(resolution, back);
    }
}
