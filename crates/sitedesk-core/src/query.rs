//! Request and response shapes of the paginated list endpoints.
//!
//! List endpoints take `page` (1-based) and `page_size` plus optional filters
//! and answer with the page of items and the full `total`.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::filters::Filters;
use crate::pagination::{PageWindow, compute_window, should_render};
use crate::prefs::{PagePreferences, SortOrder};

/// Query for one page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u64,
    pub page_size: u64,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    pub filters: Filters,
}

impl ListQuery {
    /// Build the query a page with these preferences should send.
    pub fn from_preferences(prefs: &PagePreferences) -> Self {
        Self {
            page: prefs.current_page,
            page_size: prefs.page_size,
            sort_by: prefs.sort_by.clone(),
            sort_order: prefs.sort_order,
            filters: prefs.filters.clone(),
        }
    }

    /// Query parameters in the order they are sent.
    ///
    /// Paging first, then sort when a field is set, then non-blank filters in
    /// key order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];

        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sort_by".to_string(), sort_by.clone()));
            pairs.push(("sort_order".to_string(), self.sort_order.to_string()));
        }

        pairs.extend(
            self.filters
                .active()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
        pairs
    }

    /// Form-encoded query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_pairs())
            .finish()
    }
}

impl From<&PagePreferences> for ListQuery {
    fn from(prefs: &PagePreferences) -> Self {
        Self::from_preferences(prefs)
    }
}

/// One page of results from a list endpoint.
///
/// The items array is named after the resource (`sites`, `users`); both
/// names are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(alias = "sites", alias = "users")]
    pub items: Vec<T>,
    pub total: u64,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u64>,
}

impl<T> ListResponse<T> {
    /// Page window for rendering navigation, or `None` when there is nothing
    /// to paginate.
    pub fn window(&self, current_page: u64, page_size: u64) -> Option<PageWindow> {
        should_render(self.total).then(|| compute_window(current_page, page_size, self.total))
    }

    /// Check if this page came back empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{FilterKey, FilterValue};

    #[test]
    fn test_pairs_from_defaults() {
        let query = ListQuery::from_preferences(&PagePreferences::default());
        assert_eq!(query.to_query_string(), "page=1&page_size=20");
    }

    #[test]
    fn test_pairs_with_sort_and_filters() {
        let prefs = PagePreferences {
            current_page: 2,
            sort_by: Some("full_name".to_string()),
            sort_order: SortOrder::Desc,
            filters: Filters::new()
                .with(FilterKey::Search, FilterValue::Text("ana maria".to_string()))
                .with(FilterKey::IsActive, FilterValue::Bool(true))
                .with(FilterKey::RoleId, FilterValue::Text(String::new())),
            ..Default::default()
        };
        let query = ListQuery::from(&prefs);
        assert_eq!(
            query.to_query_string(),
            "page=2&page_size=20&sort_by=full_name&sort_order=desc&search=ana+maria&is_active=true"
        );
    }

    #[test]
    fn test_response_aliases() {
        let users: ListResponse<serde_json::Value> = serde_json::from_str(
            r#"{"users":[{"id":1},{"id":2}],"total":45,"page":3,"page_size":20}"#,
        )
        .unwrap();
        assert_eq!(users.items.len(), 2);
        assert_eq!(users.total, 45);
        assert_eq!(users.page, Some(3));

        let sites: ListResponse<serde_json::Value> =
            serde_json::from_str(r#"{"sites":[],"total":0}"#).unwrap();
        assert!(sites.is_empty());
        assert!(sites.page_size.is_none());
    }

    #[test]
    fn test_window_suppressed_when_empty() {
        let empty: ListResponse<u32> = ListResponse {
            items: vec![],
            total: 0,
            page: None,
            page_size: None,
        };
        assert!(empty.window(1, 20).is_none());

        let some: ListResponse<u32> = ListResponse {
            items: vec![1, 2],
            total: 45,
            page: Some(3),
            page_size: Some(20),
        };
        let window = some.window(3, 20).unwrap();
        assert_eq!(window.start_item, 41);
        assert_eq!(window.end_item, 45);
    }
}
