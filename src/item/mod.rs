//! Canonical representation of a provider's native object.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;


/// Display name used when a provider object has no usable name
pub const PLACEHOLDER_NAME: &str = "No Name";

/// Normalized item returned by every connector.
///
/// Every field is always serialized (absent values as `null`) so consumers
/// can rely on a fixed shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegrationItem {
    /// Provider-native identifier
    pub id: String,

    /// Display string, never empty
    pub name: String,

    /// Type tag such as "Contact", "Base", "Page"
    #[serde(rename = "type")]
    pub item_type: String,

    pub parent_id: Option<String>,

    pub parent_path_or_name: Option<String>,

    /// Provider-specific fields
    pub metadata: BTreeMap<String, Option<String>>,
}

impl IntegrationItem {
    /// Creates an item, substituting [`PLACEHOLDER_NAME`] for a blank name.
    pub fn new(id: impl Into<String>, name: Option<&str>, item_type: impl Into<String>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(PLACEHOLDER_NAME)
            .to_string();

        Self {
            id: id.into(),
            name,
            item_type: item_type.into(),
            parent_id: None,
            parent_path_or_name: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: Option<String>, parent_path_or_name: Option<String>) -> Self {
        self.parent_id = parent_id;
        self.parent_path_or_name = parent_path_or_name;
        self
    }

    /// Adds a metadata field; empty strings are stored as `null`.
    pub fn with_metadata(mut self, key: &str, value: Option<&str>) -> Self {
        let value = value.filter(|v| !v.is_empty()).map(str::to_string);
        self.metadata.insert(key.to_string(), value);
        self
    }
}
