//! Search client trait definition.
//!
//! This module defines the abstract interface for the search engine requests
//! the indexer issues, allowing for different backend implementations
//! (OpenSearch, Elasticsearch, in-memory fakes for tests).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use code_indexer_shared::{AliasAction, BufferedDocument, BulkSummary, MappingResponse};

/// Abstract interface for search engine operations.
///
/// Each method corresponds to exactly one request against the engine. Callers
/// rely on that: the migration sequence is expressed as a series of awaited
/// calls, and a returned future resolving is the only signal that a step
/// finished.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, SearchError>` for consistent error handling.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Write several documents in a single bulk request.
    ///
    /// # Arguments
    ///
    /// * `documents` - Documents in the order they should be written
    ///
    /// # Returns
    ///
    /// * `Ok(BulkSummary)` - The request was accepted; item-level rejections are
    ///   reported in the summary
    /// * `Err(SearchError::BulkIndexError)` - The request was rejected as a whole
    async fn bulk(&self, documents: &[BufferedDocument]) -> Result<BulkSummary, SearchError>;

    /// Read the mappings of an index or alias.
    ///
    /// # Returns
    ///
    /// * `Ok(MappingResponse)` - Keyed by physical index name; empty when the
    ///   index or alias does not exist
    /// * `Err(SearchError)` - If the request fails
    async fn get_mapping(&self, index: &str) -> Result<MappingResponse, SearchError>;

    /// Create a physical index with the given settings and schema.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchError::IndexAlreadyExists)` - If an index with that name exists
    /// * `Err(SearchError)` - If creation fails for any other reason
    async fn create_index(
        &self,
        name: &str,
        settings: &Value,
        schema: &Value,
    ) -> Result<(), SearchError>;

    /// Apply all alias actions in one atomic request.
    async fn update_aliases(&self, actions: &[AliasAction]) -> Result<(), SearchError>;

    /// Delete a physical index. A missing index counts as deleted.
    async fn delete_index(&self, name: &str) -> Result<(), SearchError>;

    /// Copy every document of `source` into `dest`, returning once the copy
    /// is complete.
    async fn reindex(&self, source: &str, dest: &str) -> Result<(), SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
