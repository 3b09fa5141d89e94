//! Pagination configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::prefs::{DEFAULT_PAGE_SIZE, PagePreferences, ViewMode};

/// Page sizes offered by the page-size selector.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [u64; 4] = [10, 20, 50, 100];

/// Configuration shared by listing pages.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct PaginationConfig {
    /// Sizes a user may pick from.
    #[builder(default = "DEFAULT_PAGE_SIZE_OPTIONS.to_vec()")]
    pub page_size_options: Vec<u64>,

    /// Page size for pages without stored preferences.
    #[builder(default = "DEFAULT_PAGE_SIZE")]
    pub default_page_size: u64,

    /// View mode for pages without stored preferences.
    #[builder(default)]
    pub default_view_mode: ViewMode,
}

impl PaginationConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let options = self
            .page_size_options
            .clone()
            .unwrap_or_else(|| DEFAULT_PAGE_SIZE_OPTIONS.to_vec());
        let default = self.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if options.is_empty() {
            return Err("At least one page size option is required".to_string());
        }
        if options.contains(&0) {
            return Err("Page size options must be positive".to_string());
        }
        if !options.contains(&default) {
            return Err(format!(
                "Default page size {default} is not one of {options:?}"
            ));
        }
        Ok(())
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            default_page_size: DEFAULT_PAGE_SIZE,
            default_view_mode: ViewMode::List,
        }
    }
}

impl PaginationConfig {
    /// Create a new config builder.
    pub fn builder() -> PaginationConfigBuilder {
        PaginationConfigBuilder::default()
    }

    /// Check if `size` is one of the offered page sizes.
    pub fn is_allowed_page_size(&self, size: u64) -> bool {
        self.page_size_options.contains(&size)
    }

    /// Validate a page size picked by the user.
    pub fn check_page_size(&self, size: u64) -> Result<u64, CoreError> {
        if self.is_allowed_page_size(size) {
            Ok(size)
        } else {
            Err(CoreError::InvalidPageSize {
                size,
                allowed: self.page_size_options.clone(),
            })
        }
    }

    /// The record synthesized for pages that have no stored preferences.
    pub fn default_preferences(&self) -> PagePreferences {
        PagePreferences {
            view_mode: self.default_view_mode,
            page_size: self.default_page_size,
            ..PagePreferences::default()
        }
    }
}
