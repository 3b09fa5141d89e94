//! Per-page view preference types.

use std::borrow::Borrow;
use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::filters::Filters;

/// Page id used by the users management table.
pub const ADMIN_USERS: &str = "admin-users";

/// Page id used by the sites management table.
pub const ADMIN_SITES: &str = "admin-sites";

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// How a listing page lays out its items.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ViewMode {
    /// Table rows.
    #[default]
    List,
    /// Card grid.
    Grid,
}

impl ViewMode {
    /// Toggle between list and grid.
    pub fn toggle(self) -> Self {
        match self {
            Self::List => Self::Grid,
            Self::Grid => Self::List,
        }
    }
}

/// Sort direction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Flip the direction.
    pub fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Opaque identifier a page picks for its preferences (e.g. `admin-users`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(CompactString);

impl PageId {
    /// Create a page id.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(CompactString::new(id.as_ref()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for PageId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PageId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PageId {
    fn from(id: String) -> Self {
        Self(CompactString::from(id))
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display preferences for one page.
///
/// Field names serialize in camelCase so the persisted blob keeps the layout
/// `{viewMode, pageSize, currentPage, sortBy, sortOrder, filters}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PagePreferences {
    /// List or grid layout.
    pub view_mode: ViewMode,
    /// Rows per page. Membership in the allowed sizes is checked by callers.
    pub page_size: u64,
    /// 1-based page position.
    pub current_page: u64,
    /// Field the backend should sort on, if any.
    pub sort_by: Option<String>,
    /// Sort direction.
    pub sort_order: SortOrder,
    /// Active filters.
    pub filters: Filters,
}

impl Default for PagePreferences {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::List,
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
            sort_by: None,
            sort_order: SortOrder::Asc,
            filters: Filters::new(),
        }
    }
}

impl PagePreferences {
    /// Offset of the first row on the current page, as used by `OFFSET` queries.
    pub fn offset(&self) -> u64 {
        self.current_page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Check if a sort field is set.
    pub fn is_sorted(&self) -> bool {
        self.sort_by.is_some()
    }
}
