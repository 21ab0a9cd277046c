//! Facet selection snapshots.
//!
//! A [`FilterState`] is an immutable mapping from facet name to
//! [`FacetValue`]. Widgets never mutate a state in place; they produce the
//! next snapshot with [`FilterState::apply`], which is what keeps facet
//! accumulators out of shared mutable maps. Two states are *equivalent*
//! when their normalized forms are equal, and equivalence — not identity —
//! is what the canonicalizer and the query engine reason about.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Facet values
// ---------------------------------------------------------------------------

/// The value of one facet inside a [`FilterState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetValue {
    /// A single scalar selection: a text query, a year, a toggle code.
    Scalar(String),
    /// A multi-select set of option codes (enrollment years, statuses, ...).
    Multi(BTreeSet<String>),
    /// The facet is present in the mapping but does not constrain the query.
    Absent,
}

impl FacetValue {
    /// Build a multi-select value from any iterator of codes.
    pub fn multi<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multi(codes.into_iter().map(Into::into).collect())
    }

    /// Build a scalar value.
    pub fn scalar(code: impl Into<String>) -> Self {
        Self::Scalar(code.into())
    }

    /// Whether this value constrains the query at all.
    ///
    /// `Absent`, empty scalars, and empty multi-sets do not.
    #[must_use]
    pub fn is_constraining(&self) -> bool {
        match self {
            Self::Scalar(s) => !s.is_empty(),
            Self::Multi(set) => !set.is_empty(),
            Self::Absent => false,
        }
    }

    /// Normalized form: non-constraining values collapse to `Absent`, a
    /// singleton multi-set collapses to the scalar of its only code, and
    /// comma-bearing codes are split into the list they denote.
    ///
    /// The comma is the wire format's list separator by design, so an
    /// option code can never contain one; the singleton and comma rules
    /// together are what make `canonicalize`/`parse` a two-sided inverse:
    /// the wire format cannot distinguish `a` from `{a}`.
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self {
            Self::Scalar(s) if s.contains(',') => Self::Multi(split_codes([s.as_str()])).normalized(),
            Self::Scalar(s) if s.is_empty() => Self::Absent,
            Self::Multi(set) if set.iter().any(|c| c.contains(',')) => {
                Self::Multi(split_codes(set.iter().map(String::as_str))).normalized()
            }
            Self::Multi(set) if set.is_empty() => Self::Absent,
            Self::Multi(set) if set.len() == 1 => {
                Self::Scalar(set.iter().next().cloned().unwrap_or_default())
            }
            other => other.clone(),
        }
    }
}

/// Split codes on the list separator, dropping empty segments.
fn split_codes<'a, I>(codes: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    codes
        .into_iter()
        .flat_map(|code| code.split(','))
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

// ---------------------------------------------------------------------------
// Facet changes
// ---------------------------------------------------------------------------

/// One facet-widget event: "facet `facet` is now `value`".
///
/// Emitted by the external widget collaborator and folded into the next
/// [`FilterState`] by the owning component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetChange {
    /// Facet name.
    pub facet: String,
    /// New value for the facet.
    pub value: FacetValue,
}

impl FacetChange {
    /// Convenience constructor.
    pub fn new(facet: impl Into<String>, value: FacetValue) -> Self {
        Self {
            facet: facet.into(),
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

/// Immutable snapshot of all facet selections.
///
/// Facet names are kept in sorted order (`BTreeMap`) so iteration order is
/// deterministic everywhere a state is serialized or compared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    facets: BTreeMap<String, FacetValue>,
}

impl FilterState {
    /// An empty state: no facet constrains the query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style scalar facet.
    #[must_use]
    pub fn with_scalar(mut self, facet: impl Into<String>, code: impl Into<String>) -> Self {
        self.facets
            .insert(facet.into(), FacetValue::Scalar(code.into()));
        self
    }

    /// Builder-style multi-select facet.
    #[must_use]
    pub fn with_multi<I, S>(mut self, facet: impl Into<String>, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facets.insert(facet.into(), FacetValue::multi(codes));
        self
    }

    /// Look up one facet's value.
    #[must_use]
    pub fn get(&self, facet: &str) -> Option<&FacetValue> {
        self.facets.get(facet)
    }

    /// Number of facets present in the mapping (constraining or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Whether the mapping holds no facets at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Iterate facets in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FacetValue)> {
        self.facets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Produce the next snapshot with one facet changed.
    ///
    /// This is the fold step for facet-widget events: the receiver is left
    /// untouched and a new state is returned.
    #[must_use]
    pub fn apply(&self, change: &FacetChange) -> Self {
        let mut next = self.clone();
        next.facets
            .insert(change.facet.clone(), change.value.clone());
        next
    }

    /// Normalized form: `Absent` and empty entries dropped, singleton
    /// multi-sets collapsed to scalars.
    ///
    /// Two states are equivalent exactly when their normalized forms are
    /// equal; the canonical query string is derived from this form.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let facets = self
            .facets
            .iter()
            .filter_map(|(name, value)| {
                let value = value.normalized();
                value
                    .is_constraining()
                    .then(|| (name.clone(), value))
            })
            .collect();
        Self { facets }
    }

    /// Equivalence per the normalization rules above.
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl FromIterator<(String, FacetValue)> for FilterState {
    fn from_iter<T: IntoIterator<Item = (String, FacetValue)>>(iter: T) -> Self {
        Self {
            facets: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_leaves_original_untouched() {
        let base = FilterState::new().with_scalar("q", "rust");
        let next = base.apply(&FacetChange::new("year", FacetValue::scalar("2024")));
        assert!(base.get("year").is_none());
        assert_eq!(next.get("year"), Some(&FacetValue::scalar("2024")));
        assert_eq!(next.get("q"), Some(&FacetValue::scalar("rust")));
    }

    #[test]
    fn absent_facets_do_not_affect_equivalence() {
        let a = FilterState::new().with_scalar("q", "rust");
        let mut b = a.clone();
        b = b.apply(&FacetChange::new("status", FacetValue::Absent));
        assert_ne!(a, b);
        assert!(a.is_equivalent(&b));
    }

    #[test]
    fn empty_scalar_is_not_constraining() {
        let a = FilterState::new().with_scalar("q", "");
        assert!(a.is_equivalent(&FilterState::new()));
    }

    #[test]
    fn empty_multi_is_not_constraining() {
        let a = FilterState::new().with_multi("years", Vec::<String>::new());
        assert!(a.is_equivalent(&FilterState::new()));
    }

    #[test]
    fn singleton_multi_equals_scalar() {
        let multi = FilterState::new().with_multi("status", ["active"]);
        let scalar = FilterState::new().with_scalar("status", "active");
        assert!(multi.is_equivalent(&scalar));
    }

    #[test]
    fn multi_order_is_irrelevant() {
        let a = FilterState::new().with_multi("years", ["2023", "2021", "2022"]);
        let b = FilterState::new().with_multi("years", ["2021", "2022", "2023"]);
        assert!(a.is_equivalent(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn different_values_are_not_equivalent() {
        let a = FilterState::new().with_scalar("q", "rust");
        let b = FilterState::new().with_scalar("q", "go");
        assert!(!a.is_equivalent(&b));
    }

    #[test]
    fn normalized_drops_absent_entries() {
        let state = FilterState::new()
            .with_scalar("q", "rust")
            .apply(&FacetChange::new("year", FacetValue::Absent));
        let normalized = state.normalized();
        assert_eq!(normalized.len(), 1);
        assert!(normalized.get("year").is_none());
    }

    #[test]
    fn comma_bearing_scalar_normalizes_to_list() {
        let scalar = FilterState::new().with_scalar("years", "2023,2021");
        let multi = FilterState::new().with_multi("years", ["2021", "2023"]);
        assert!(scalar.is_equivalent(&multi));
    }

    #[test]
    fn comma_bearing_multi_code_is_flattened() {
        let nested = FilterState::new().with_multi("years", ["2021,2022", "2023"]);
        let flat = FilterState::new().with_multi("years", ["2021", "2022", "2023"]);
        assert!(nested.is_equivalent(&flat));
    }

    #[test]
    fn lone_separator_is_not_constraining() {
        let state = FilterState::new().with_scalar("years", ",");
        assert!(state.is_equivalent(&FilterState::new()));
    }

    #[test]
    fn serde_roundtrip() {
        let state = FilterState::new()
            .with_scalar("q", "rust")
            .with_multi("years", ["2023", "2024"]);
        let json = serde_json::to_string(&state).expect("serialize");
        let back: FilterState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(state, back);
    }
}
