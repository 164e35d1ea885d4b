//! Documents waiting in a write buffer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single document-index request held until the next bulk write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferedDocument {
    /// Target index (or alias).
    pub index: String,
    /// Document type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// The document source.
    pub body: Value,
}

impl BufferedDocument {
    pub fn new(index: impl Into<String>, type_name: impl Into<String>, body: Value) -> Self {
        Self {
            index: index.into(),
            type_name: type_name.into(),
            body,
        }
    }
}
