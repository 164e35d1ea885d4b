//! Mapping-read response model.
//!
//! A mapping read against an alias answers with the physical index it
//! resolves to, so the response is keyed by physical index name. Two layouts
//! are understood: typed (`mappings.<type>._meta`) and typeless
//! (`mappings._meta`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version metadata stored alongside a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingMeta {
    #[serde(default)]
    pub version: Option<u64>,
}

/// The part of a type mapping the indexer cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeMapping {
    #[serde(rename = "_meta", default)]
    pub meta: Option<MappingMeta>,
}

impl TypeMapping {
    fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn version(&self) -> Option<u64> {
        self.meta.as_ref().and_then(|meta| meta.version)
    }
}

/// Mappings of a single physical index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexMapping {
    #[serde(default)]
    pub mappings: Map<String, Value>,
}

impl IndexMapping {
    /// Stored version for `type_name`; 0 when no version metadata exists.
    pub fn stored_version(&self, type_name: &str) -> u64 {
        let typed = self
            .mappings
            .get(type_name)
            .filter(|value| value.is_object())
            .map(TypeMapping::from_value)
            .and_then(|mapping| mapping.version());

        typed
            .or_else(|| {
                self.mappings
                    .get("_meta")
                    .and_then(|meta| serde_json::from_value::<MappingMeta>(meta.clone()).ok())
                    .and_then(|meta| meta.version)
            })
            .unwrap_or(0)
    }
}

/// Mapping-read result, keyed by physical index name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingResponse {
    pub indices: BTreeMap<String, IndexMapping>,
}

impl MappingResponse {
    /// A response for an alias that resolves to nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The physical index behind the alias and its stored version for `type_name`.
    ///
    /// Returns `None` when no live index exists. If the alias resolves to more
    /// than one index, the one with the lowest stored version wins so that a
    /// stale index is never reported as current.
    pub fn stored_version(&self, type_name: &str) -> Option<(&str, u64)> {
        self.indices
            .iter()
            .map(|(name, mapping)| (name.as_str(), mapping.stored_version(type_name)))
            .min_by_key(|(_, version)| *version)
    }
}
