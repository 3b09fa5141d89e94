//! The view-preference store.
//!
//! A [`PreferenceStore`] owns one [`PreferenceRegistry`] and a storage
//! backend. It is created by the application root and handed to pages by
//! reference; there is no global instance. Every mutation runs the registry
//! reducer and the write-through to storage inside the lock of a `watch`
//! channel, so concurrent callers are serialized and subscribers only wake up
//! when the registry actually changed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use sitedesk_core::{
    Filters, ListQuery, PageId, PagePreferences, PageWindow, PaginationConfig, PreferenceAction,
    PreferenceRegistry, SortOrder, ViewMode, clamp_page, compute_window, should_render,
    total_pages,
};

use crate::error::StoreResult;
use crate::persist::{self, STORAGE_KEY};
use crate::storage::{MemoryStorage, PreferenceStorage};

/// Options for opening a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Storage key the registry is persisted under.
    pub key: String,
    /// Record synthesized for pages without stored preferences.
    pub defaults: PagePreferences,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key: STORAGE_KEY.to_string(),
            defaults: PagePreferences::default(),
        }
    }
}

impl StoreOptions {
    /// Options whose defaults follow a pagination config.
    pub fn from_config(config: &PaginationConfig) -> Self {
        Self {
            defaults: config.default_preferences(),
            ..Self::default()
        }
    }

    /// Use a different storage key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

/// Single source of truth for per-page view preferences.
pub struct PreferenceStore {
    storage: Arc<dyn PreferenceStorage>,
    options: StoreOptions,
    state: watch::Sender<PreferenceRegistry>,
    /// Set while storage lags behind the in-memory registry.
    unsaved: AtomicBool,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("storage", &self.storage.name())
            .field("options", &self.options)
            .field("pages", &self.state.borrow().len())
            .field("unsaved", &self.has_unsaved_changes())
            .finish()
    }
}

impl PreferenceStore {
    /// Open a store, hydrating it from `storage`.
    ///
    /// Missing, unreadable, or outdated stored data leaves the store empty.
    pub fn open(storage: Arc<dyn PreferenceStorage>, options: StoreOptions) -> Self {
        let registry = hydrate(storage.as_ref(), &options);
        let (state, _) = watch::channel(registry);
        Self {
            storage,
            options,
            state,
            unsaved: AtomicBool::new(false),
        }
    }

    /// Store backed by process memory only.
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()), StoreOptions::default())
    }

    /// Options the store was opened with.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Preferences for `page_id`, or the synthesized default.
    pub fn get_page_preferences(&self, page_id: &str) -> PagePreferences {
        self.state.borrow().get(page_id)
    }

    /// Current registry. Cheap: entries are shared, not copied.
    pub fn snapshot(&self) -> PreferenceRegistry {
        self.state.borrow().clone()
    }

    /// Ids of pages with stored preferences.
    pub fn page_ids(&self) -> Vec<PageId> {
        self.state.borrow().page_ids().cloned().collect()
    }

    /// Whether the last write to storage failed.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved.load(Ordering::Acquire)
    }

    /// Receive the registry whenever it changes.
    pub fn subscribe(&self) -> watch::Receiver<PreferenceRegistry> {
        self.state.subscribe()
    }

    /// Switch list/grid view. Returns to the first page.
    pub fn set_view_mode(&self, page_id: impl Into<PageId>, mode: ViewMode) -> StoreResult<()> {
        self.dispatch(PreferenceAction::SetViewMode {
            page_id: page_id.into(),
            mode,
        })
    }

    /// Change rows per page. Returns to the first page.
    pub fn set_page_size(&self, page_id: impl Into<PageId>, size: u64) -> StoreResult<()> {
        self.dispatch(PreferenceAction::SetPageSize {
            page_id: page_id.into(),
            size,
        })
    }

    /// Jump to `page`. Not validated against the page count.
    pub fn set_current_page(&self, page_id: impl Into<PageId>, page: u64) -> StoreResult<()> {
        self.dispatch(PreferenceAction::SetCurrentPage {
            page_id: page_id.into(),
            page,
        })
    }

    /// Change the sort. Keeps the current page.
    pub fn set_sort(
        &self,
        page_id: impl Into<PageId>,
        sort_by: Option<String>,
        sort_order: SortOrder,
    ) -> StoreResult<()> {
        self.dispatch(PreferenceAction::SetSort {
            page_id: page_id.into(),
            sort_by,
            sort_order,
        })
    }

    /// Replace all filters. Returns to the first page.
    pub fn set_filters(&self, page_id: impl Into<PageId>, filters: Filters) -> StoreResult<()> {
        self.dispatch(PreferenceAction::SetFilters {
            page_id: page_id.into(),
            filters,
        })
    }

    /// Forget the preferences of one page.
    pub fn reset_page_preferences(&self, page_id: impl Into<PageId>) -> StoreResult<()> {
        self.dispatch(PreferenceAction::Reset {
            page_id: page_id.into(),
        })
    }

    /// Forget the preferences of every page.
    pub fn clear_all_preferences(&self) -> StoreResult<()> {
        self.dispatch(PreferenceAction::ClearAll)
    }

    /// Move to the next page of a list with `total_items` results.
    ///
    /// Stays on the last page. Returns the resulting page.
    pub fn next_page(&self, page_id: impl Into<PageId>, total_items: u64) -> StoreResult<u64> {
        let page_id = page_id.into();
        self.navigate(
            &page_id,
            PreferenceAction::NextPage {
                page_id: page_id.clone(),
                total_items,
            },
        )
    }

    /// Move to the previous page of a list with `total_items` results.
    ///
    /// Stays on the first page. A stored page past the end steps back from
    /// the last page. Returns the resulting page.
    pub fn previous_page(
        &self,
        page_id: impl Into<PageId>,
        total_items: u64,
    ) -> StoreResult<u64> {
        let page_id = page_id.into();
        self.navigate(
            &page_id,
            PreferenceAction::PreviousPage {
                page_id: page_id.clone(),
                total_items,
            },
        )
    }

    /// Page window for a list with `total_items` results, or `None` when the
    /// selector should not be shown.
    ///
    /// A stored page past the end is shown as the last page; the stored value
    /// is left alone.
    pub fn window(&self, page_id: &str, total_items: u64) -> Option<PageWindow> {
        let prefs = self.get_page_preferences(page_id);
        should_render(total_items).then(|| {
            let page = clamp_page(
                prefs.current_page,
                total_pages(total_items, prefs.page_size),
            );
            compute_window(page, prefs.page_size, total_items)
        })
    }

    /// Backend query for the page's current preferences.
    pub fn list_query(&self, page_id: &str) -> ListQuery {
        ListQuery::from_preferences(&self.get_page_preferences(page_id))
    }

    /// Re-read the registry from storage, replacing in-memory state.
    ///
    /// Unsaved in-memory changes are discarded.
    pub fn reload(&self) {
        let next = hydrate(self.storage.as_ref(), &self.options);
        self.state.send_if_modified(|registry| {
            self.unsaved.store(false, Ordering::Release);
            if *registry == next {
                false
            } else {
                *registry = next;
                true
            }
        });
    }

    /// Write the current registry to storage.
    pub fn flush(&self) -> StoreResult<()> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|registry| {
            outcome = self.persist(registry);
            false
        });
        outcome
    }

    fn dispatch(&self, action: PreferenceAction) -> StoreResult<()> {
        self.transition(action).1
    }

    fn navigate(&self, page_id: &PageId, action: PreferenceAction) -> StoreResult<u64> {
        let (registry, outcome) = self.transition(action);
        outcome?;
        Ok(registry.get(page_id.as_str()).current_page)
    }

    /// Run `action` and the write-through under the channel lock.
    ///
    /// Returns the registry the action produced. A no-op action still retries
    /// the write when storage is behind.
    fn transition(&self, action: PreferenceAction) -> (PreferenceRegistry, StoreResult<()>) {
        let name = action.name();
        let page_id = action.page_id().map(ToString::to_string);
        let mut outcome = Ok(());
        let mut after = None;

        let changed = self.state.send_if_modified(|registry| {
            let next = registry.apply(action);
            if next.ptr_eq(registry) {
                if self.has_unsaved_changes() {
                    outcome = self.persist(registry);
                }
                after = Some(next);
                return false;
            }
            outcome = self.persist(&next);
            *registry = next.clone();
            after = Some(next);
            true
        });

        debug!(
            action = name,
            page_id = page_id.as_deref().unwrap_or("*"),
            changed,
            "Applied preference action"
        );

        if let Err(e) = &outcome {
            warn!(
                action = name,
                storage = self.storage.name(),
                error = %e,
                "Failed to persist preferences, keeping in-memory state"
            );
        }
        (after.unwrap_or_else(|| self.snapshot()), outcome)
    }

    /// Write `registry` to storage. Must run under the channel lock.
    fn persist(&self, registry: &PreferenceRegistry) -> StoreResult<()> {
        let result = persist::encode(registry)
            .and_then(|blob| self.storage.write(&self.options.key, &blob));
        self.unsaved.store(result.is_err(), Ordering::Release);
        result?;
        debug!(
            key = %self.options.key,
            pages = registry.len(),
            storage = self.storage.name(),
            "Saved preferences"
        );
        Ok(())
    }
}

fn hydrate(storage: &dyn PreferenceStorage, options: &StoreOptions) -> PreferenceRegistry {
    let empty = || PreferenceRegistry::with_defaults(options.defaults.clone());

    let blob = match storage.read(&options.key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return empty(),
        Err(e) => {
            warn!(
                key = %options.key,
                storage = storage.name(),
                error = %e,
                "Could not read stored preferences, starting empty"
            );
            return empty();
        }
    };

    match persist::decode(&blob) {
        Some(persisted) => {
            let registry = persisted.into_registry(options.defaults.clone());
            info!(
                key = %options.key,
                pages = registry.len(),
                storage = storage.name(),
                "Loaded stored preferences"
            );
            registry
        }
        None => empty(),
    }
}
