//! Index creation request.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Everything needed to create (or migrate to) the physical index behind an alias.
///
/// The target schema version travels inside the schema itself, at
/// `schema._meta.version`, so the same value ends up stored in the live
/// mapping once the index is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexCreationRequest {
    /// The alias callers read and write through.
    pub index: String,
    /// The document type the schema describes.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Index settings (shards, analyzers, ...).
    #[serde(default = "empty_object")]
    pub settings: Value,
    /// The mapping body for `type_name`.
    #[serde(default = "empty_object")]
    pub schema: Value,
}

fn empty_object() -> Value {
    json!({})
}

impl IndexCreationRequest {
    /// Create a request with empty settings and schema.
    pub fn new(index: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            type_name: type_name.into(),
            settings: empty_object(),
            schema: empty_object(),
        }
    }

    /// Set the index settings.
    pub fn with_settings(mut self, settings: Value) -> Self {
        self.settings = settings;
        self
    }

    /// Set the schema. Any version already embedded in it is kept.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    /// Embed the target version at `schema._meta.version`.
    ///
    /// A non-object schema is replaced by an object holding only the metadata.
    pub fn with_version(mut self, version: u64) -> Self {
        if !self.schema.is_object() {
            self.schema = empty_object();
        }
        let meta = self
            .schema
            .as_object_mut()
            .map(|schema| schema.entry("_meta").or_insert_with(empty_object));
        match meta {
            Some(Value::Object(meta)) => {
                meta.insert("version".to_string(), json!(version));
            }
            Some(other) => *other = json!({ "version": version }),
            None => {}
        }
        self
    }

    /// The target version embedded in the schema, if any.
    pub fn target_version(&self) -> Option<u64> {
        self.schema
            .get("_meta")
            .and_then(|meta| meta.get("version"))
            .and_then(Value::as_u64)
    }

    /// Name of the physical index that holds `version` of this alias.
    pub fn versioned_index_name(&self, version: u64) -> String {
        format!("{}-{}", self.index, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_version_embeds_meta() {
        let request = IndexCreationRequest::new("code", "file")
            .with_schema(json!({ "properties": { "path": { "type": "keyword" } } }))
            .with_version(3);

        assert_eq!(request.target_version(), Some(3));
        assert_eq!(request.schema["_meta"]["version"], 3);
        assert_eq!(request.schema["properties"]["path"]["type"], "keyword");
    }

    #[test]
    fn test_with_version_keeps_other_meta_fields() {
        let request = IndexCreationRequest::new("code", "file")
            .with_schema(json!({ "_meta": { "owner": "indexer", "version": 1 } }))
            .with_version(2);

        assert_eq!(request.target_version(), Some(2));
        assert_eq!(request.schema["_meta"]["owner"], "indexer");
    }

    #[test]
    fn test_target_version_missing() {
        let request = IndexCreationRequest::new("code", "file");
        assert_eq!(request.target_version(), None);

        let request = request.with_schema(json!({ "_meta": { "version": "two" } }));
        assert_eq!(request.target_version(), None);
    }

    #[test]
    fn test_versioned_index_name() {
        let request = IndexCreationRequest::new("code-symbols", "symbol");
        assert_eq!(request.versioned_index_name(4), "code-symbols-4");
    }

    #[test]
    fn test_deserialize_with_type_key() {
        let request: IndexCreationRequest = serde_json::from_value(json!({
            "index": "code",
            "type": "file",
            "schema": { "_meta": { "version": 7 } }
        }))
        .unwrap();

        assert_eq!(request.type_name, "file");
        assert_eq!(request.settings, json!({}));
        assert_eq!(request.target_version(), Some(7));
    }
}
