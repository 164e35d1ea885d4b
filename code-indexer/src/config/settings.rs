//! Indexer settings read from the environment.

use std::env;
use std::path::PathBuf;

use crate::IndexerError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default number of documents per bulk write.
const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default location of the index creation requests.
const DEFAULT_REQUESTS_PATH: &str = "indices.json";

/// Settings for one indexer process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    /// OpenSearch server URL.
    pub opensearch_url: String,
    /// Documents buffered before a bulk write.
    pub batch_size: usize,
    /// JSON file holding the index creation requests to upgrade at startup.
    pub requests_path: PathBuf,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            opensearch_url: DEFAULT_OPENSEARCH_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            requests_path: PathBuf::from(DEFAULT_REQUESTS_PATH),
        }
    }
}

impl IndexerConfig {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `INDEX_BATCH_SIZE`: documents per bulk write (default: 1000)
    /// - `INDEX_REQUESTS_PATH`: index creation requests file (default: indices.json)
    pub fn from_env() -> Result<Self, IndexerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let batch_size = match lookup("INDEX_BATCH_SIZE") {
            Some(raw) => {
                let size = raw.trim().parse::<usize>().map_err(|e| {
                    IndexerError::config(format!("INDEX_BATCH_SIZE={:?}: {}", raw, e))
                })?;
                if size == 0 {
                    return Err(IndexerError::config("INDEX_BATCH_SIZE must be positive"));
                }
                size
            }
            None => defaults.batch_size,
        };

        Ok(Self {
            opensearch_url: lookup("OPENSEARCH_URL").unwrap_or(defaults.opensearch_url),
            batch_size,
            requests_path: lookup("INDEX_REQUESTS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.requests_path),
        })
    }
}
