//! Alias update actions.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One action of an atomic alias update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AliasAction {
    /// Point `alias` at `index`.
    Add { index: String, alias: String },
    /// Stop `alias` resolving to `index`.
    Remove { index: String, alias: String },
    /// Delete a concrete index in the same atomic update, freeing its name
    /// for use as an alias.
    RemoveIndex { index: String },
}

impl AliasAction {
    pub fn add(index: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Add {
            index: index.into(),
            alias: alias.into(),
        }
    }

    pub fn remove(index: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Remove {
            index: index.into(),
            alias: alias.into(),
        }
    }

    pub fn remove_index(index: impl Into<String>) -> Self {
        Self::RemoveIndex {
            index: index.into(),
        }
    }

    /// The `_aliases` API representation of this action.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Add { index, alias } => json!({ "add": { "index": index, "alias": alias } }),
            Self::Remove { index, alias } => {
                json!({ "remove": { "index": index, "alias": alias } })
            }
            Self::RemoveIndex { index } => json!({ "remove_index": { "index": index } }),
        }
    }
}
