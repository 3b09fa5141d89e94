//! Typed list filters.
//!
//! The back-office list endpoints understand a small, known set of filters.
//! Those get their own variants and value types; anything else goes through
//! [`FilterKey::Custom`] with an inferred value.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Filter name as sent to the backend.
///
/// Keys compare by the name they are sent under, so `Custom("search")` is the
/// same key as `Search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterKey {
    /// Free text search over names and codes.
    Search,
    /// Site status.
    Status,
    /// User role.
    RoleId,
    /// Active or deactivated users.
    IsActive,
    /// Any other backend filter.
    Custom(String),
}

impl FilterKey {
    /// Key for an arbitrary backend filter name. Known names map to their
    /// own variant.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::from(name.into())
    }

    fn known(name: &str) -> Option<Self> {
        match name {
            "search" => Some(Self::Search),
            "status" => Some(Self::Status),
            "role_id" => Some(Self::RoleId),
            "is_active" => Some(Self::IsActive),
            _ => None,
        }
    }

    /// Sort position: known keys first, in declaration order, then by name.
    fn rank(&self) -> (u8, &str) {
        match self {
            Self::Search => (0, ""),
            Self::Status => (1, ""),
            Self::RoleId => (2, ""),
            Self::IsActive => (3, ""),
            Self::Custom(name) => match Self::known(name) {
                Some(known) => (known.rank().0, ""),
                None => (4, name),
            },
        }
    }

    /// Name used in query strings and the persisted blob.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Search => "search",
            Self::Status => "status",
            Self::RoleId => "role_id",
            Self::IsActive => "is_active",
            Self::Custom(name) => name,
        }
    }

    /// Interpret a raw string as a value for this key.
    pub fn parse_value(&self, raw: &str) -> Result<FilterValue, CoreError> {
        match self {
            Self::Search | Self::Status | Self::RoleId => Ok(FilterValue::Text(raw.to_string())),
            Self::IsActive => parse_bool(raw)
                .map(FilterValue::Bool)
                .ok_or_else(|| CoreError::invalid_filter(self.as_str(), raw, "expected true or false")),
            Self::Custom(name) => match Self::known(name) {
                Some(known) => known.parse_value(raw),
                None => Ok(FilterValue::infer(raw)),
            },
        }
    }
}

impl From<String> for FilterKey {
    fn from(name: String) -> Self {
        Self::known(&name).unwrap_or(Self::Custom(name))
    }
}

impl PartialEq for FilterKey {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl Eq for FilterKey {}

impl PartialOrd for FilterKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FilterKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl Hash for FilterKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
    }
}

impl From<&str> for FilterKey {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<FilterKey> for String {
    fn from(key: FilterKey) -> Self {
        match key {
            FilterKey::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl FilterValue {
    /// Guess the type of a raw value: bool, then integer, then text.
    pub fn infer(raw: &str) -> Self {
        if let Some(flag) = parse_bool(raw) {
            Self::Bool(flag)
        } else if let Ok(number) = raw.parse::<i64>() {
            Self::Integer(number)
        } else {
            Self::Text(raw.to_string())
        }
    }

    /// Empty text means "no filter".
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Integer(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Active filters for a page, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<FilterKey, FilterValue>);

impl Filters {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `KEY=VALUE` assignments into a filter set.
    pub fn parse_assignments<I, S>(assignments: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filters = Self::new();
        for assignment in assignments {
            let (key, value) = Self::parse_assignment(assignment.as_ref())?;
            filters.insert(key, value);
        }
        Ok(filters)
    }

    /// Parse a single `KEY=VALUE` assignment.
    pub fn parse_assignment(input: &str) -> Result<(FilterKey, FilterValue), CoreError> {
        let (key, value) = input
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| CoreError::MalformedAssignment {
                input: input.to_string(),
            })?;

        let key = FilterKey::from(key.trim());
        let value = key.parse_value(value.trim())?;
        Ok((key, value))
    }

    /// Set a filter, returning the previous value.
    pub fn insert(&mut self, key: FilterKey, value: FilterValue) -> Option<FilterValue> {
        self.0.insert(key, value)
    }

    /// Builder-style insert.
    pub fn with(mut self, key: FilterKey, value: FilterValue) -> Self {
        self.insert(key, value);
        self
    }

    /// Remove a filter.
    pub fn remove(&mut self, key: &FilterKey) -> Option<FilterValue> {
        self.0.remove(key)
    }

    /// Get the value of a filter.
    pub fn get(&self, key: &FilterKey) -> Option<&FilterValue> {
        self.0.get(key)
    }

    /// Check if no filters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of filters set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate filters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&FilterKey, &FilterValue)> {
        self.0.iter()
    }

    /// Iterate filters that would actually narrow a query.
    pub fn active(&self) -> impl Iterator<Item = (&FilterKey, &FilterValue)> {
        self.0.iter().filter(|(_, value)| !value.is_blank())
    }
}

impl FromIterator<(FilterKey, FilterValue)> for Filters {
    fn from_iter<T: IntoIterator<Item = (FilterKey, FilterValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_round_trip_names() {
        for name in ["search", "status", "role_id", "is_active"] {
            let key = FilterKey::from(name);
            assert!(!matches!(key, FilterKey::Custom(_)), "{name} should be known");
            assert_eq!(key.as_str(), name);
        }
        assert_eq!(
            FilterKey::from("region"),
            FilterKey::Custom("region".to_string())
        );
    }

    #[test]
    fn test_custom_known_name_is_same_key() {
        assert_eq!(FilterKey::custom("search"), FilterKey::Search);
        assert_eq!(FilterKey::Custom("search".to_string()), FilterKey::Search);
        assert_ne!(FilterKey::custom("region"), FilterKey::Search);

        let filters = Filters::new()
            .with(FilterKey::Search, FilterValue::Text("ion".to_string()))
            .with(
                FilterKey::Custom("search".to_string()),
                FilterValue::Text("sol".to_string()),
            );
        assert_eq!(filters.len(), 1);
        assert_eq!(
            serde_json::to_string(&filters).unwrap(),
            r#"{"search":"sol"}"#
        );
    }

    #[test]
    fn test_custom_keys_sort_after_known() {
        let filters = Filters::new()
            .with(FilterKey::custom("zone"), FilterValue::Integer(3))
            .with(FilterKey::custom("area"), FilterValue::Integer(1))
            .with(FilterKey::IsActive, FilterValue::Bool(false));
        let names: Vec<_> = filters.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(names, vec!["is_active", "area", "zone"]);
    }

    #[test]
    fn test_is_active_requires_bool() {
        assert_eq!(
            FilterKey::IsActive.parse_value("TRUE").unwrap(),
            FilterValue::Bool(true)
        );
        let err = FilterKey::IsActive.parse_value("yes").unwrap_err();
        assert!(matches!(err, CoreError::InvalidFilter { .. }));
    }

    #[test]
    fn test_search_stays_text() {
        assert_eq!(
            FilterKey::Search.parse_value("42").unwrap(),
            FilterValue::Text("42".to_string())
        );
    }

    #[test]
    fn test_custom_value_inference() {
        let key = FilterKey::Custom("limit".to_string());
        assert_eq!(key.parse_value("10").unwrap(), FilterValue::Integer(10));
        assert_eq!(key.parse_value("false").unwrap(), FilterValue::Bool(false));
        assert_eq!(
            key.parse_value("north").unwrap(),
            FilterValue::Text("north".to_string())
        );
    }

    #[test]
    fn test_parse_assignments() {
        let filters = Filters::parse_assignments(["status=active", "is_active = false"]).unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(
            filters.get(&FilterKey::Status),
            Some(&FilterValue::Text("active".to_string()))
        );
        assert_eq!(
            filters.get(&FilterKey::IsActive),
            Some(&FilterValue::Bool(false))
        );
    }

    #[test]
    fn test_malformed_assignment() {
        assert!(matches!(
            Filters::parse_assignment("status"),
            Err(CoreError::MalformedAssignment { .. })
        ));
        assert!(matches!(
            Filters::parse_assignment("=x"),
            Err(CoreError::MalformedAssignment { .. })
        ));
    }

    #[test]
    fn test_blank_text_is_inactive() {
        let filters = Filters::new()
            .with(FilterKey::Search, FilterValue::Text(String::new()))
            .with(FilterKey::Status, FilterValue::Text("paused".to_string()));
        let active: Vec<_> = filters.active().map(|(key, _)| key.clone()).collect();
        assert_eq!(active, vec![FilterKey::Status]);
    }

    #[test]
    fn test_serialized_as_plain_map() {
        let filters = Filters::new()
            .with(FilterKey::IsActive, FilterValue::Bool(true))
            .with(FilterKey::Search, FilterValue::Text("ion".to_string()));
        let json = serde_json::to_string(&filters).unwrap();
        assert_eq!(json, r#"{"search":"ion","is_active":true}"#);

        let back: Filters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, filters);
    }
}
