//! User settings stored in a TOML config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use sitedesk_core::{
    CoreError, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS, PaginationConfig, ViewMode,
};

use crate::error::{StoreError, StoreResult};
use crate::persist::STORAGE_KEY;
use crate::store::StoreOptions;

/// Persistent user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Directory for the preference blob. Defaults to the platform data dir.
    pub storage_dir: Option<PathBuf>,
    /// Key the preference blob is stored under.
    pub storage_key: String,
    /// Page sizes offered by the page-size selector.
    pub page_size_options: Vec<u64>,
    /// Page size for pages without stored preferences.
    pub default_page_size: u64,
    /// View mode for pages without stored preferences.
    pub default_view_mode: ViewMode,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            storage_dir: None,
            storage_key: STORAGE_KEY.to_string(),
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            default_page_size: DEFAULT_PAGE_SIZE,
            default_view_mode: ViewMode::List,
        }
    }
}

impl UserSettings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sitedesk").join("settings.toml"))
    }

    /// Load settings from the default location, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Load settings from an explicit file, reporting what is wrong with it.
    pub fn load_from(path: &Path) -> StoreResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        let settings = toml::from_str(&content).map_err(|e| StoreError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Save settings to the default location.
    pub fn save(&self) -> StoreResult<()> {
        let path = Self::config_path().ok_or(StoreError::NoPlatformDirectory)?;
        self.save_to(&path)
    }

    /// Save settings to an explicit file.
    pub fn save_to(&self, path: &Path) -> StoreResult<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| StoreError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        std::fs::write(path, content).map_err(|e| StoreError::io(path, e))
    }

    /// Validated pagination config.
    pub fn pagination_config(&self) -> StoreResult<PaginationConfig> {
        PaginationConfig::builder()
            .page_size_options(self.page_size_options.clone())
            .default_page_size(self.default_page_size)
            .default_view_mode(self.default_view_mode)
            .build()
            .map_err(|e| {
                StoreError::Core(CoreError::InvalidConfig {
                    message: e.to_string(),
                })
            })
    }

    /// Store options matching these settings.
    pub fn store_options(&self) -> StoreResult<StoreOptions> {
        Ok(StoreOptions::from_config(&self.pagination_config()?).with_key(&self.storage_key))
    }

    /// Directory the preference blob lives in.
    pub fn resolved_storage_dir(&self) -> StoreResult<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join("sitedesk"))
                .ok_or(StoreError::NoPlatformDirectory),
        }
    }
}
