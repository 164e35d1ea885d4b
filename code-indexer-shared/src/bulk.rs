//! Bulk write results.

use serde::{Deserialize, Serialize};

/// Per-item outcome of one bulk write.
///
/// A bulk request can be accepted as a whole while individual items are
/// rejected; those show up in `failed` and `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSummary {
    /// Number of documents sent.
    pub total: usize,
    /// Number of documents the engine accepted.
    pub succeeded: usize,
    /// Number of documents the engine rejected.
    pub failed: usize,
    /// Rejection reasons, one per failed item.
    pub errors: Vec<String>,
    /// Server-side processing time in milliseconds.
    pub took_ms: u64,
}

impl BulkSummary {
    /// A summary where every one of `total` documents succeeded.
    pub fn all_succeeded(total: usize) -> Self {
        Self {
            total,
            succeeded: total,
            ..Default::default()
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
