//! Copy-on-write registry of page preferences.
//!
//! [`PreferenceRegistry::apply`] is the only way a registry changes: it takes
//! a [`PreferenceAction`] and returns a new registry. Records are held behind
//! `Arc`, so entries an action does not touch stay pointer-identical between
//! the old and new registry and consumers can skip re-rendering them.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::filters::Filters;
use crate::pagination::{advance, clamp_page, retreat, total_pages};
use crate::prefs::{PageId, PagePreferences, SortOrder, ViewMode};

/// A state transition on the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceAction {
    /// Switch list/grid. Resets the page.
    SetViewMode { page_id: PageId, mode: ViewMode },
    /// Change rows per page. Resets the page.
    SetPageSize { page_id: PageId, size: u64 },
    /// Jump to a page, taken verbatim.
    SetCurrentPage { page_id: PageId, page: u64 },
    /// Change sort field and direction. Keeps the page.
    SetSort {
        page_id: PageId,
        sort_by: Option<String>,
        sort_order: SortOrder,
    },
    /// Replace all filters. Resets the page.
    SetFilters { page_id: PageId, filters: Filters },
    /// Step forward in a list of `total_items`. Stays on the last page.
    NextPage { page_id: PageId, total_items: u64 },
    /// Step back in a list of `total_items`. Stays on the first page.
    PreviousPage { page_id: PageId, total_items: u64 },
    /// Drop the stored record for a page.
    Reset { page_id: PageId },
    /// Drop every stored record.
    ClearAll,
}

impl PreferenceAction {
    /// Page the action targets, if it targets a single page.
    pub fn page_id(&self) -> Option<&PageId> {
        match self {
            Self::SetViewMode { page_id, .. }
            | Self::SetPageSize { page_id, .. }
            | Self::SetCurrentPage { page_id, .. }
            | Self::SetSort { page_id, .. }
            | Self::SetFilters { page_id, .. }
            | Self::NextPage { page_id, .. }
            | Self::PreviousPage { page_id, .. }
            | Self::Reset { page_id } => Some(page_id),
            Self::ClearAll => None,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetViewMode { .. } => "set_view_mode",
            Self::SetPageSize { .. } => "set_page_size",
            Self::SetCurrentPage { .. } => "set_current_page",
            Self::SetSort { .. } => "set_sort",
            Self::SetFilters { .. } => "set_filters",
            Self::NextPage { .. } => "next_page",
            Self::PreviousPage { .. } => "previous_page",
            Self::Reset { .. } => "reset",
            Self::ClearAll => "clear_all",
        }
    }

    fn is_navigation(&self) -> bool {
        matches!(self, Self::NextPage { .. } | Self::PreviousPage { .. })
    }

    /// Apply this action to a single record.
    fn update(self, prefs: &mut PagePreferences) {
        match self {
            Self::SetViewMode { mode, .. } => {
                prefs.view_mode = mode;
                prefs.current_page = 1;
            }
            Self::SetPageSize { size, .. } => {
                prefs.page_size = size;
                prefs.current_page = 1;
            }
            Self::SetCurrentPage { page, .. } => {
                prefs.current_page = page;
            }
            Self::SetSort {
                sort_by,
                sort_order,
                ..
            } => {
                prefs.sort_by = sort_by;
                prefs.sort_order = sort_order;
            }
            Self::SetFilters { filters, .. } => {
                prefs.filters = filters;
                prefs.current_page = 1;
            }
            // A stored page past the end steps from the last real page.
            Self::NextPage { total_items, .. } => {
                let pages = total_pages(total_items, prefs.page_size);
                prefs.current_page = advance(clamp_page(prefs.current_page, pages), pages);
            }
            Self::PreviousPage { total_items, .. } => {
                let pages = total_pages(total_items, prefs.page_size);
                prefs.current_page = retreat(clamp_page(prefs.current_page, pages));
            }
            Self::Reset { .. } | Self::ClearAll => {}
        }
    }
}

/// Map from page id to that page's preferences.
#[derive(Debug, Clone)]
pub struct PreferenceRegistry {
    entries: Arc<BTreeMap<PageId, Arc<PagePreferences>>>,
    defaults: Arc<PagePreferences>,
}

impl Default for PreferenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PreferenceRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries && self.defaults == other.defaults
    }
}

impl Eq for PreferenceRegistry {}

impl PreferenceRegistry {
    /// Create an empty registry with the stock defaults.
    pub fn new() -> Self {
        Self::with_defaults(PagePreferences::default())
    }

    /// Create an empty registry that synthesizes `defaults` for unknown pages.
    pub fn with_defaults(defaults: PagePreferences) -> Self {
        Self {
            entries: Arc::new(BTreeMap::new()),
            defaults: Arc::new(defaults),
        }
    }

    /// Create a registry from stored records.
    pub fn from_entries(
        entries: BTreeMap<PageId, PagePreferences>,
        defaults: PagePreferences,
    ) -> Self {
        Self {
            entries: Arc::new(
                entries
                    .into_iter()
                    .map(|(id, prefs)| (id, Arc::new(prefs)))
                    .collect(),
            ),
            defaults: Arc::new(defaults),
        }
    }

    /// Plain copy of the stored records, for persistence.
    pub fn to_entries(&self) -> BTreeMap<PageId, PagePreferences> {
        self.entries
            .iter()
            .map(|(id, prefs)| (id.clone(), PagePreferences::clone(prefs)))
            .collect()
    }

    /// The record returned for pages without stored preferences.
    pub fn defaults(&self) -> &PagePreferences {
        &self.defaults
    }

    /// Preferences for `page_id`, or the synthesized default.
    ///
    /// The default is not inserted; the page only gets an entry on its first
    /// mutation.
    pub fn get(&self, page_id: &str) -> PagePreferences {
        match self.entries.get(page_id) {
            Some(prefs) => PagePreferences::clone(prefs),
            None => PagePreferences::clone(&self.defaults),
        }
    }

    /// Stored record for `page_id`, if any.
    pub fn entry(&self, page_id: &str) -> Option<&Arc<PagePreferences>> {
        self.entries.get(page_id)
    }

    /// Check if `page_id` has a stored record.
    pub fn contains(&self, page_id: &str) -> bool {
        self.entries.contains_key(page_id)
    }

    /// Ids of pages with stored records.
    pub fn page_ids(&self) -> impl Iterator<Item = &PageId> {
        self.entries.keys()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether both registries share the same underlying map.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    /// Apply an action, returning the next registry.
    ///
    /// Actions that would leave the registry unchanged return a registry that
    /// shares this one's map, so `ptr_eq` holds.
    pub fn apply(&self, action: PreferenceAction) -> Self {
        match action {
            PreferenceAction::ClearAll => {
                if self.entries.is_empty() {
                    return self.clone();
                }
                self.replace_entries(BTreeMap::new())
            }
            PreferenceAction::Reset { page_id } => {
                if !self.entries.contains_key(&page_id) {
                    return self.clone();
                }
                let mut entries = BTreeMap::clone(&self.entries);
                entries.remove(&page_id);
                self.replace_entries(entries)
            }
            action => {
                let Some(page_id) = action.page_id().cloned() else {
                    return self.clone();
                };
                let existing = self.entries.get(&page_id);
                let mut next = existing.map_or_else(
                    || PagePreferences::clone(&self.defaults),
                    |prefs| PagePreferences::clone(prefs),
                );
                let navigation = action.is_navigation();
                action.update(&mut next);

                // Navigation that goes nowhere does not create an entry.
                let unchanged = match existing {
                    Some(prefs) => **prefs == next,
                    None => navigation && next == *self.defaults,
                };
                if unchanged {
                    return self.clone();
                }

                let mut entries = BTreeMap::clone(&self.entries);
                entries.insert(page_id, Arc::new(next));
                self.replace_entries(entries)
            }
        }
    }

    fn replace_entries(&self, entries: BTreeMap<PageId, Arc<PagePreferences>>) -> Self {
        Self {
            entries: Arc::new(entries),
            defaults: Arc::clone(&self.defaults),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{FilterKey, FilterValue};

    fn set_page(id: &str, page: u64) -> PreferenceAction {
        PreferenceAction::SetCurrentPage {
            page_id: id.into(),
            page,
        }
    }

    #[test]
    fn test_get_does_not_insert() {
        let registry = PreferenceRegistry::new();
        assert_eq!(registry.get("admin-users"), PagePreferences::default());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_view_mode_resets_page() {
        let registry = PreferenceRegistry::new()
            .apply(set_page("admin-users", 7))
            .apply(PreferenceAction::SetViewMode {
                page_id: "admin-users".into(),
                mode: ViewMode::Grid,
            });
        let prefs = registry.get("admin-users");
        assert_eq!(prefs.view_mode, ViewMode::Grid);
        assert_eq!(prefs.current_page, 1);
    }

    #[test]
    fn test_page_size_and_filters_reset_page() {
        let registry = PreferenceRegistry::new()
            .apply(set_page("admin-sites", 4))
            .apply(PreferenceAction::SetPageSize {
                page_id: "admin-sites".into(),
                size: 50,
            });
        assert_eq!(registry.get("admin-sites").current_page, 1);
        assert_eq!(registry.get("admin-sites").page_size, 50);

        let registry = registry.apply(set_page("admin-sites", 3)).apply(
            PreferenceAction::SetFilters {
                page_id: "admin-sites".into(),
                filters: Filters::new()
                    .with(FilterKey::Status, FilterValue::Text("active".to_string())),
            },
        );
        assert_eq!(registry.get("admin-sites").current_page, 1);
        assert_eq!(registry.get("admin-sites").filters.len(), 1);
    }

    #[test]
    fn test_sort_keeps_page() {
        let registry = PreferenceRegistry::new()
            .apply(set_page("admin-users", 6))
            .apply(PreferenceAction::SetSort {
                page_id: "admin-users".into(),
                sort_by: Some("full_name".to_string()),
                sort_order: SortOrder::Desc,
            });
        let prefs = registry.get("admin-users");
        assert_eq!(prefs.current_page, 6);
        assert_eq!(prefs.sort_by.as_deref(), Some("full_name"));
        assert_eq!(prefs.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_first_mutation_merges_defaults() {
        let defaults = PagePreferences {
            page_size: 50,
            ..Default::default()
        };
        let registry =
            PreferenceRegistry::with_defaults(defaults).apply(set_page("admin-users", 2));
        let prefs = registry.get("admin-users");
        assert_eq!(prefs.page_size, 50);
        assert_eq!(prefs.current_page, 2);
        assert!(registry.contains("admin-users"));
    }

    #[test]
    fn test_untouched_entries_keep_identity() {
        let before = PreferenceRegistry::new()
            .apply(set_page("admin-users", 2))
            .apply(set_page("admin-sites", 3));
        let after = before.apply(set_page("admin-sites", 4));

        assert!(!after.ptr_eq(&before));
        assert!(Arc::ptr_eq(
            before.entry("admin-users").unwrap(),
            after.entry("admin-users").unwrap()
        ));
        assert!(!Arc::ptr_eq(
            before.entry("admin-sites").unwrap(),
            after.entry("admin-sites").unwrap()
        ));
        // The old registry is untouched.
        assert_eq!(before.get("admin-sites").current_page, 3);
    }

    #[test]
    fn test_noop_action_shares_map() {
        let registry = PreferenceRegistry::new().apply(set_page("admin-users", 2));
        assert!(registry.apply(set_page("admin-users", 2)).ptr_eq(&registry));
        assert!(
            registry
                .apply(PreferenceAction::Reset {
                    page_id: "missing".into()
                })
                .ptr_eq(&registry)
        );
        assert!(
            PreferenceRegistry::new()
                .apply(PreferenceAction::ClearAll)
                .is_empty()
        );
    }

    #[test]
    fn test_navigation_steps_within_bounds() {
        let next = |registry: &PreferenceRegistry| {
            registry.apply(PreferenceAction::NextPage {
                page_id: "admin-sites".into(),
                total_items: 45,
            })
        };
        let registry = next(&next(&next(&PreferenceRegistry::new())));
        assert_eq!(registry.get("admin-sites").current_page, 3);

        let registry = registry.apply(PreferenceAction::PreviousPage {
            page_id: "admin-sites".into(),
            total_items: 45,
        });
        assert_eq!(registry.get("admin-sites").current_page, 2);
    }

    #[test]
    fn test_navigation_clamps_stale_page() {
        let registry = PreferenceRegistry::new().apply(set_page("admin-users", 9));

        let back = registry.apply(PreferenceAction::PreviousPage {
            page_id: "admin-users".into(),
            total_items: 45,
        });
        assert_eq!(back.get("admin-users").current_page, 2);

        let forward = registry.apply(PreferenceAction::NextPage {
            page_id: "admin-users".into(),
            total_items: 45,
        });
        assert_eq!(forward.get("admin-users").current_page, 3);
    }

    #[test]
    fn test_navigation_in_place_creates_no_entry() {
        let registry = PreferenceRegistry::new();
        let after = registry.apply(PreferenceAction::PreviousPage {
            page_id: "admin-users".into(),
            total_items: 45,
        });
        assert!(after.ptr_eq(&registry));
        assert!(after.is_empty());
    }

    #[test]
    fn test_reset_reverts_to_default() {
        let registry = PreferenceRegistry::new()
            .apply(set_page("admin-users", 9))
            .apply(PreferenceAction::Reset {
                page_id: "admin-users".into(),
            });
        assert!(!registry.contains("admin-users"));
        assert_eq!(registry.get("admin-users"), PagePreferences::default());
    }

    #[test]
    fn test_clear_all() {
        let registry = PreferenceRegistry::new()
            .apply(set_page("a", 2))
            .apply(set_page("b", 3))
            .apply(PreferenceAction::ClearAll);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_entries_round_trip() {
        let registry = PreferenceRegistry::new().apply(set_page("admin-users", 5));
        let rebuilt =
            PreferenceRegistry::from_entries(registry.to_entries(), PagePreferences::default());
        assert_eq!(rebuilt, registry);
    }
}
