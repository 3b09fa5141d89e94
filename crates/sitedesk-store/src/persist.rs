//! Versioned encoding of the preference registry.
//!
//! The blob layout is
//!
//! ```json
//! {"state": {"preferences": {"admin-users": {"viewMode": "grid", ...}}}, "version": 1}
//! ```
//!
//! Stored preferences are a soft cache. Anything that fails to decode, or was
//! written under another schema version, is dropped and the store starts
//! empty.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use sitedesk_core::{PageId, PagePreferences, PreferenceRegistry};

use crate::error::StoreResult;

/// Storage key the registry is written under.
pub const STORAGE_KEY: &str = "view-preferences-storage";

/// Schema version of the persisted blob.
pub const SCHEMA_VERSION: u32 = 1;

/// Persisted part of the store state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub preferences: BTreeMap<PageId, PagePreferences>,
}

/// Envelope around the persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedPreferences {
    pub state: PersistedState,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl PersistedPreferences {
    /// Capture a registry for writing.
    pub fn from_registry(registry: &PreferenceRegistry) -> Self {
        Self {
            state: PersistedState {
                preferences: registry.to_entries(),
            },
            version: SCHEMA_VERSION,
            saved_at: Some(Utc::now()),
        }
    }

    /// Rebuild a registry, synthesizing `defaults` for unknown pages.
    pub fn into_registry(self, defaults: PagePreferences) -> PreferenceRegistry {
        PreferenceRegistry::from_entries(self.state.preferences, defaults)
    }
}

/// Encode a registry into its stored blob.
pub fn encode(registry: &PreferenceRegistry) -> StoreResult<String> {
    Ok(serde_json::to_string(&PersistedPreferences::from_registry(
        registry,
    ))?)
}

/// Decode a stored blob.
///
/// Returns `None` when the blob is unreadable or from another schema version.
pub fn decode(blob: &str) -> Option<PersistedPreferences> {
    let persisted: PersistedPreferences = match serde_json::from_str(blob) {
        Ok(persisted) => persisted,
        Err(e) => {
            warn!(error = %e, "Discarding unreadable stored preferences");
            return None;
        }
    };

    if persisted.version != SCHEMA_VERSION {
        warn!(
            version = persisted.version,
            expected = SCHEMA_VERSION,
            "Discarding stored preferences from another schema version"
        );
        return None;
    }

    Some(persisted)
}
