//! Page window arithmetic for page-selector controls.
//!
//! Everything here is pure and cheap enough to run on every render. Pages are
//! 1-based to match the list endpoints (`page`, `page_size`, `total`).

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Maximum number of numeric slots before the selector collapses with ellipses.
pub const MAX_VISIBLE_PAGES: u64 = 5;

/// A single slot in the page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageToken {
    /// A clickable page number.
    Page(u64),
    /// Collapsed run of pages.
    Ellipsis,
}

impl PageToken {
    /// Page number, if this token is not an ellipsis.
    pub fn page(self) -> Option<u64> {
        match self {
            Self::Page(page) => Some(page),
            Self::Ellipsis => None,
        }
    }

    /// Check if this token is an ellipsis.
    pub fn is_ellipsis(self) -> bool {
        matches!(self, Self::Ellipsis)
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(page) => write!(f, "{page}"),
            Self::Ellipsis => f.write_str("…"),
        }
    }
}

/// Rendering data derived from `(current_page, page_size, total_items)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// Page the window was computed for (not clamped).
    pub current_page: u64,
    /// Items per page.
    pub page_size: u64,
    /// Full result count reported by the backend.
    pub total_items: u64,
    /// `ceil(total_items / page_size)`.
    pub total_pages: u64,
    /// 1-based index of the first item on the current page.
    pub start_item: u64,
    /// 1-based index of the last item on the current page.
    pub end_item: u64,
    /// Page numbers and ellipses to render.
    pub tokens: Vec<PageToken>,
}

impl PageWindow {
    /// Whether a "previous" control should be enabled.
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Whether a "next" control should be enabled.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Check if `page` is the page this window was computed for.
    pub fn is_current(&self, page: u64) -> bool {
        self.current_page == page
    }

    /// Page that the "next" control leads to.
    pub fn next_page(&self) -> u64 {
        advance(self.current_page, self.total_pages)
    }

    /// Page that the "previous" control leads to.
    pub fn previous_page(&self) -> u64 {
        retreat(self.current_page)
    }

    /// Render the selector as a single line, marking the current page.
    ///
    /// `‹ 1 … 4 [5] 6 … 10 ›`
    pub fn selector_line(&self) -> String {
        let pages = self
            .tokens
            .iter()
            .map(|token| match token {
                PageToken::Page(page) if self.is_current(*page) => format!("[{page}]"),
                other => other.to_string(),
            })
            .join(" ");

        let prev = if self.has_previous() { "‹" } else { " " };
        let next = if self.has_next() { "›" } else { " " };
        format!("{prev} {pages} {next}")
    }
}

impl fmt::Display for PageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} - {} of {}",
            self.start_item, self.end_item, self.total_items
        )
    }
}

/// Number of pages needed for `total_items`.
///
/// A zero page size yields zero pages instead of dividing by zero.
pub fn total_pages(total_items: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Whether a page selector should be shown at all.
pub fn should_render(total_items: u64) -> bool {
    total_items > 0
}

/// Clamp a requested page into `[1, total_pages]`.
///
/// With no pages at all the result is 1, the position an empty list starts at.
pub fn clamp_page(page: u64, total_pages: u64) -> u64 {
    page.clamp(1, total_pages.max(1))
}

/// Compute the page window. Does not clamp `current_page`.
pub fn compute_window(current_page: u64, page_size: u64, total_items: u64) -> PageWindow {
    let total_pages = total_pages(total_items, page_size);
    let start_item = current_page
        .saturating_sub(1)
        .saturating_mul(page_size)
        .saturating_add(1);
    let end_item = current_page.saturating_mul(page_size).min(total_items);

    PageWindow {
        current_page,
        page_size,
        total_items,
        total_pages,
        start_item,
        end_item,
        tokens: visible_page_tokens(current_page, total_pages),
    }
}

/// Page numbers to show for `current_page` out of `total_pages`.
///
/// At most [`MAX_VISIBLE_PAGES`] numbered slots around the edges, with the
/// first and last page always reachable once the list is collapsed.
pub fn visible_page_tokens(current_page: u64, total_pages: u64) -> Vec<PageToken> {
    use PageToken::{Ellipsis, Page};

    if total_pages <= MAX_VISIBLE_PAGES {
        return (1..=total_pages).map(Page).collect();
    }

    if current_page <= 3 {
        vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(total_pages)]
    } else if current_page >= total_pages - 2 {
        vec![
            Page(1),
            Ellipsis,
            Page(total_pages - 3),
            Page(total_pages - 2),
            Page(total_pages - 1),
            Page(total_pages),
        ]
    } else {
        vec![
            Page(1),
            Ellipsis,
            Page(current_page - 1),
            Page(current_page),
            Page(current_page + 1),
            Ellipsis,
            Page(total_pages),
        ]
    }
}

/// Next page, staying put on the last page.
pub fn advance(current_page: u64, total_pages: u64) -> u64 {
    if current_page < total_pages {
        current_page + 1
    } else {
        current_page
    }
}

/// Previous page, staying put on the first page.
pub fn retreat(current_page: u64) -> u64 {
    if current_page > 1 {
        current_page - 1
    } else {
        current_page
    }
}

#[cfg(test)]
mod tests {
    use super::PageToken::{Ellipsis, Page};
    use super::*;

    #[test]
    fn test_window_item_range() {
        let window = compute_window(2, 20, 45);
        assert_eq!(window.total_pages, 3);
        assert_eq!(window.start_item, 21);
        assert_eq!(window.end_item, 40);
        assert_eq!(window.tokens, vec![Page(1), Page(2), Page(3)]);
    }

    #[test]
    fn test_window_last_partial_page() {
        let window = compute_window(3, 20, 45);
        assert_eq!(window.start_item, 41);
        assert_eq!(window.end_item, 45);
        assert!(!window.has_next());
        assert!(window.has_previous());
    }

    #[test]
    fn test_zero_page_size_has_no_pages() {
        let window = compute_window(1, 0, 45);
        assert_eq!(window.total_pages, 0);
        assert!(window.tokens.is_empty());
    }

    #[test]
    fn test_middle_window() {
        assert_eq!(
            visible_page_tokens(5, 10),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_boundary_between_head_and_middle() {
        assert_eq!(
            visible_page_tokens(3, 10),
            vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(10)]
        );
        assert_eq!(
            visible_page_tokens(4, 10),
            vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_six_pages_prefers_head_window() {
        // currentPage 3 satisfies both the head and tail rule; head wins.
        assert_eq!(
            visible_page_tokens(3, 6),
            vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(6)]
        );
        assert_eq!(
            visible_page_tokens(4, 6),
            vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Page(6)]
        );
    }

    #[test]
    fn test_advance_and_retreat_clamp() {
        assert_eq!(advance(3, 3), 3);
        assert_eq!(advance(2, 3), 3);
        assert_eq!(retreat(1), 1);
        assert_eq!(retreat(2), 1);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 4), 1);
        assert_eq!(clamp_page(9, 4), 4);
        assert_eq!(clamp_page(3, 4), 3);
        assert_eq!(clamp_page(5, 0), 1);
    }

    #[test]
    fn test_display_summary() {
        let window = compute_window(2, 20, 45);
        assert_eq!(window.to_string(), "Showing 21 - 40 of 45");
    }

    #[test]
    fn test_selector_line_marks_current() {
        let window = compute_window(5, 10, 100);
        assert_eq!(window.selector_line(), "‹ 1 … 4 [5] 6 … 10 ›");

        let first = compute_window(1, 10, 30);
        assert_eq!(first.selector_line(), "  [1] 2 3 ›");
    }

    #[test]
    fn test_should_render() {
        assert!(!should_render(0));
        assert!(should_render(1));
    }
}
