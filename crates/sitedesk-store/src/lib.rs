//! Persisted view preferences for sitedesk listing pages.
//!
//! [`PreferenceStore`] is the single owner of every page's preferences. It
//! wraps the copy-on-write registry from `sitedesk-core`, writes through to a
//! [`PreferenceStorage`] backend after each change, and lets consumers
//! subscribe to changes.
//!
//! ```rust
//! use sitedesk_core::{ADMIN_USERS, ViewMode};
//! use sitedesk_store::PreferenceStore;
//!
//! let store = PreferenceStore::in_memory();
//! store.set_current_page(ADMIN_USERS, 4).unwrap();
//! store.set_view_mode(ADMIN_USERS, ViewMode::Grid).unwrap();
//!
//! let prefs = store.get_page_preferences(ADMIN_USERS);
//! assert_eq!(prefs.view_mode, ViewMode::Grid);
//! assert_eq!(prefs.current_page, 1);
//! ```

mod error;
pub mod persist;
mod settings;
mod storage;
mod store;

pub use error::{StoreError, StoreResult};
pub use persist::{PersistedPreferences, PersistedState, SCHEMA_VERSION, STORAGE_KEY};
pub use settings::UserSettings;
pub use storage::{FileStorage, MemoryStorage, PreferenceStorage};
pub use store::{PreferenceStore, StoreOptions};

// Re-export core types
pub use sitedesk_core::{
    FilterKey, FilterValue, Filters, PageId, PagePreferences, PreferenceRegistry, SortOrder,
    ViewMode,
};
