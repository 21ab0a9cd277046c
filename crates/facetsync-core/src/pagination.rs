//! Bounded, ellipsis-aware pagination model.
//!
//! [`compute_pages`] is a pure function from `(total_items, page_size,
//! current_page)` to a button sequence; it is recomputed on every render
//! and never cached, so a renderer can stay a dumb projection of its
//! input. The window holds at most ten numbered pages centered on the
//! current page, framed by prev/next anchors and always-visible first/last
//! pages. A gap of exactly one elided page is rendered as the real page
//! button; only gaps of two or more collapse into an ellipsis.
//!
//! ```
//! use facetsync_core::pagination::{compute_pages, PageKind};
//!
//! let pages = compute_pages(300, 10, 15);
//! assert_eq!(pages.first().map(|p| p.kind), Some(PageKind::PrevAnchor));
//! assert!(pages.iter().any(|p| p.kind == PageKind::Ellipsis));
//! ```

use serde::{Deserialize, Serialize};

/// What one pagination button means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// A directly clickable page number. The button whose `page` equals
    /// the current page is the active one.
    Number,
    /// A collapsed run of two or more pages; `page` is the first elided
    /// page, usable as a jump target.
    Ellipsis,
    /// The "previous" control. `page` is the page it navigates to; when it
    /// equals the current page (already on page 1) the renderer disables it.
    PrevAnchor,
    /// The "next" control, mirror of [`PageKind::PrevAnchor`].
    NextAnchor,
}

/// One pagination button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// Target page of this button.
    pub page: u32,
    /// Button meaning.
    pub kind: PageKind,
}

impl PageDescriptor {
    const fn number(page: u32) -> Self {
        Self {
            page,
            kind: PageKind::Number,
        }
    }
}

/// Numbered pages shown at most in one window.
const WINDOW: u32 = 10;

/// Compute the page-button sequence for a result listing.
///
/// Returns an empty vec when the listing fits on one page (no pager is
/// shown) or when `page_size` is zero. `current_page` is clamped to
/// `[1, total_pages]` before the window is chosen.
#[must_use]
pub fn compute_pages(total_items: u64, page_size: u32, current_page: u32) -> Vec<PageDescriptor> {
    if page_size == 0 {
        return Vec::new();
    }
    let total_pages = total_items.div_ceil(u64::from(page_size));
    let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);
    if total_pages <= 1 {
        return Vec::new();
    }

    let current = current_page.clamp(1, total_pages);

    // Ten-page window centered on the current page, clamped to the ends.
    let (start, end) = if total_pages <= WINDOW {
        (1, total_pages)
    } else if current <= 6 {
        (1, WINDOW)
    } else if current + 4 >= total_pages {
        (total_pages - (WINDOW - 1), total_pages)
    } else {
        (current - 5, current + 4)
    };

    let mut out = Vec::with_capacity(WINDOW as usize + 6);
    out.push(PageDescriptor {
        page: current.saturating_sub(1).max(1),
        kind: PageKind::PrevAnchor,
    });

    if start > 1 {
        out.push(PageDescriptor::number(1));
        push_gap(&mut out, 2, start - 1);
    }
    for page in start..=end {
        out.push(PageDescriptor::number(page));
    }
    if end < total_pages {
        push_gap(&mut out, end + 1, total_pages);
        out.push(PageDescriptor::number(total_pages));
    }

    out.push(PageDescriptor {
        page: (current + 1).min(total_pages),
        kind: PageKind::NextAnchor,
    });
    out
}

/// Emit the pages elided between a window edge and an anchor.
///
/// `first..limit` (exclusive) are the elided pages: exactly one becomes a
/// real button, two or more become a single ellipsis.
fn push_gap(out: &mut Vec<PageDescriptor>, first: u32, limit: u32) {
    match limit.saturating_sub(first) {
        0 => {}
        1 => out.push(PageDescriptor::number(first)),
        _ => out.push(PageDescriptor {
            page: first,
            kind: PageKind::Ellipsis,
        }),
    }
}
