//! Core types for sitedesk listing pages.
//!
//! This crate holds the pure parts of the back-office listing pages: the
//! page window arithmetic behind page selectors, the per-page view preference
//! record, typed list filters, and the copy-on-write registry that owns all
//! preference records. Nothing here performs I/O; persistence lives in
//! `sitedesk-store`.
//!
//! ```rust
//! use sitedesk_core::{PageToken, compute_window};
//!
//! let window = compute_window(5, 10, 100);
//! assert_eq!(window.total_pages, 10);
//! assert_eq!(window.tokens[1], PageToken::Ellipsis);
//! ```

mod config;
mod error;
mod filters;
pub mod pagination;
mod prefs;
mod query;
mod registry;

pub use config::{DEFAULT_PAGE_SIZE_OPTIONS, PaginationConfig, PaginationConfigBuilder};
pub use error::CoreError;
pub use filters::{FilterKey, FilterValue, Filters};
pub use pagination::{
    MAX_VISIBLE_PAGES, PageToken, PageWindow, advance, clamp_page, compute_window, retreat,
    should_render, total_pages, visible_page_tokens,
};
pub use prefs::{
    ADMIN_SITES, ADMIN_USERS, DEFAULT_PAGE_SIZE, PageId, PagePreferences, SortOrder, ViewMode,
};
pub use query::{ListQuery, ListResponse};
pub use registry::{PreferenceAction, PreferenceRegistry};
