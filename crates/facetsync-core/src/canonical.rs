//! Deterministic query-string canonicalization.
//!
//! [`canonicalize`] maps a [`FilterState`] equivalence class to exactly one
//! [`QueryKey`]; [`parse`] is its inverse up to equivalence. The wire format
//! is `facet1=v1&facet2=a,b,c`:
//!
//! - keys in alphabetical order,
//! - multi-select values sorted and comma-joined,
//! - absent/empty facets omitted entirely (never serialized as `f=`),
//! - everything percent-encoded as UTF-8 **except** the comma.
//!
//! The literal comma is a deliberate deviation from RFC 3986 (which
//! reserves it): this format treats the comma as the list separator and an
//! unreserved character, so existing saved URLs keep working. Codes can
//! therefore never contain a comma; [`FilterState::normalized`] splits
//! comma-bearing codes into the list they denote.
//!
//! ```
//! use facetsync_core::canonical::{canonicalize, parse};
//! use facetsync_core::filter::FilterState;
//!
//! let state = FilterState::new()
//!     .with_scalar("q", "rust")
//!     .with_multi("years", ["2024", "2023"]);
//! let key = canonicalize(&state);
//! assert_eq!(key.as_str(), "q=rust&years=2023,2024");
//! assert!(parse(key.as_str()).is_equivalent(&state));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::{FacetValue, FilterState};

// ---------------------------------------------------------------------------
// Query key
// ---------------------------------------------------------------------------

/// Canonical query string derived from a [`FilterState`] equivalence class.
///
/// `canonicalize(a) == canonicalize(b)` holds exactly when `a ≡ b`, so keys
/// can be compared instead of states wherever ordering or dedup matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(String);

impl QueryKey {
    /// View as the canonical query string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no facet constrains the query.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<QueryKey> for String {
    fn from(key: QueryKey) -> Self {
        key.0
    }
}

// ---------------------------------------------------------------------------
// Canonicalize
// ---------------------------------------------------------------------------

/// Serialize a filter state into its canonical query string.
///
/// Operates on the normalized form, so equivalent states always produce
/// byte-identical keys.
#[must_use]
pub fn canonicalize(state: &FilterState) -> QueryKey {
    let normalized = state.normalized();
    let mut out = String::new();
    for (name, value) in normalized.iter() {
        if !out.is_empty() {
            out.push('&');
        }
        escape_into(&mut out, name);
        out.push('=');
        match value {
            FacetValue::Scalar(code) => escape_into(&mut out, code),
            FacetValue::Multi(codes) => {
                for (i, code) in codes.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    escape_into(&mut out, code);
                }
            }
            // Normalization never yields Absent entries.
            FacetValue::Absent => {}
        }
    }
    QueryKey(out)
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

/// Parse a query string back into a (normalized) filter state.
///
/// Lenient by design, since the input is a user-shareable URL:
///
/// - a leading `?` is accepted and ignored,
/// - `f=` and bare `f` are treated as absent and dropped,
/// - duplicate keys: the last occurrence wins,
/// - invalid percent-escapes pass through literally,
/// - `+` decodes to a space (form-encoding compatibility).
#[must_use]
pub fn parse(query: &str) -> FilterState {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut state = FilterState::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (raw_name, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        if raw_value.is_empty() {
            continue;
        }
        let name = unescape(raw_name);
        let value = if raw_value.contains(',') {
            FacetValue::multi(
                raw_value
                    .split(',')
                    .filter(|segment| !segment.is_empty())
                    .map(unescape),
            )
        } else {
            FacetValue::Scalar(unescape(raw_value))
        };
        state = state.apply(&crate::filter::FacetChange::new(name, value));
    }
    state.normalized()
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// Unreserved per RFC 3986, plus the comma (list separator by design).
fn is_literal(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~' | b',')
}

fn escape_into(out: &mut String, raw: &str) {
    use fmt::Write;

    for byte in raw.bytes() {
        if is_literal(byte) {
            out.push(byte as char);
        } else {
            // Infallible for String.
            let _ = write!(out, "%{byte:02X}");
        }
    }
}

fn unescape(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => match (hex_digit(bytes.get(i + 1)), hex_digit(bytes.get(i + 2))) {
                (Some(hi), Some(lo)) => {
                    out.push(hi * 16 + lo);
                    i += 3;
                }
                _ => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(byte: Option<&u8>) -> Option<u8> {
    byte.and_then(|b| (*b as char).to_digit(16)).map(|d| d as u8)
}
