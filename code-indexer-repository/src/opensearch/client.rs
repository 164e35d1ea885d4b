//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::{
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
        StatusCode,
    },
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesGetMappingParts},
    BulkParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::SearchClient;
use code_indexer_shared::{AliasAction, BufferedDocument, BulkSummary, MappingResponse};

/// Error type OpenSearch reports when creating an index that exists.
const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// OpenSearch client implementation.
///
/// OpenSearch mappings are typeless: documents are written without a `_type`
/// and the schema of an `IndexCreationRequest` becomes the index's top-level
/// `mappings`.
///
/// # Example
///
/// ```ignore
/// let client = OpenSearchClient::new("http://localhost:9200").await?;
/// let mapping = client.get_mapping("code").await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If connection setup fails
    pub async fn new(url: &str) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, "Created OpenSearch client");

        Ok(Self { client })
    }

    /// Lines of a bulk request: one action line followed by the document
    /// source, per document, in document order.
    fn bulk_lines(documents: &[BufferedDocument]) -> Vec<Value> {
        let mut lines = Vec::with_capacity(documents.len() * 2);
        for document in documents {
            lines.push(json!({ "index": { "_index": document.index } }));
            lines.push(document.body.clone());
        }
        lines
    }

    /// Build the NDJSON body of a bulk request.
    fn bulk_body(documents: &[BufferedDocument]) -> Vec<JsonBody<Value>> {
        Self::bulk_lines(documents)
            .into_iter()
            .map(JsonBody::from)
            .collect()
    }

    /// Turn a bulk response body into a summary of item outcomes.
    fn summarize_bulk(total: usize, body: &Value) -> BulkSummary {
        let took_ms = body["took"].as_u64().unwrap_or(0);

        if !body["errors"].as_bool().unwrap_or(false) {
            return BulkSummary {
                took_ms,
                ..BulkSummary::all_succeeded(total)
            };
        }

        let errors: Vec<String> = body["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_object().and_then(|op| op.values().next()))
                    .filter_map(|result| {
                        let error = result.get("error")?;
                        Some(format!(
                            "{}: {}",
                            error["type"].as_str().unwrap_or("unknown"),
                            error["reason"].as_str().unwrap_or("no reason given")
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let failed = errors.len().min(total);
        BulkSummary {
            total,
            succeeded: total - failed,
            failed,
            errors,
            took_ms,
        }
    }

    /// Describe what went wrong in a reindex response, if anything did.
    fn reindex_failures(body: &Value) -> Option<String> {
        let failures = body["failures"].as_array()?;
        if failures.is_empty() {
            return None;
        }

        let first = failures[0]["cause"]["reason"]
            .as_str()
            .unwrap_or("no reason given");
        Some(format!("{} documents failed to copy, first: {}", failures.len(), first))
    }

    /// Read the body of a failed response for error reporting.
    async fn error_body(response: Response) -> String {
        response.text().await.unwrap_or_default()
    }
}

#[async_trait]
impl SearchClient for OpenSearchClient {
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn bulk(&self, documents: &[BufferedDocument]) -> Result<BulkSummary, SearchError> {
        if documents.is_empty() {
            return Ok(BulkSummary::default());
        }

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(Self::bulk_body(documents))
            .send()
            .await
            .map_err(|e| SearchError::bulk_index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchError::bulk_index(format!(
                "Bulk failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let summary = Self::summarize_bulk(documents.len(), &body);
        if summary.has_failures() {
            warn!(
                failed = summary.failed,
                total = summary.total,
                "Bulk request had item failures"
            );
        }
        Ok(summary)
    }

    #[instrument(skip(self))]
    async fn get_mapping(&self, index: &str) -> Result<MappingResponse, SearchError> {
        let response = self
            .client
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::mapping(e.to_string()))?;

        let status = response.status_code();
        if status == StatusCode::NOT_FOUND {
            debug!(index = %index, "No live index behind name");
            return Ok(MappingResponse::empty());
        }
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Get mapping request failed");
            return Err(SearchError::mapping(format!(
                "Get mapping failed with status {}: {}",
                status, error_body
            )));
        }

        response
            .json::<MappingResponse>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))
    }

    #[instrument(skip(self, settings, schema))]
    async fn create_index(
        &self,
        name: &str,
        settings: &Value,
        schema: &Value,
    ) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(name))
            .body(json!({
                "settings": settings,
                "mappings": schema
            }))
            .send()
            .await
            .map_err(|e| SearchError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if status == StatusCode::BAD_REQUEST {
            let body: Value = response
                .json()
                .await
                .map_err(|e| SearchError::parse(e.to_string()))?;

            if body["error"]["type"].as_str() == Some(ALREADY_EXISTS_ERROR) {
                return Err(SearchError::IndexAlreadyExists(name.to_string()));
            }

            return Err(SearchError::index_creation(
                body["error"]["reason"]
                    .as_str()
                    .unwrap_or("Unknown error")
                    .to_string(),
            ));
        }
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Create index request failed");
            return Err(SearchError::index_creation(format!(
                "Create index failed with status {}: {}",
                status, error_body
            )));
        }

        info!(index = %name, "Index created");
        Ok(())
    }

    #[instrument(skip(self, actions), fields(count = actions.len()))]
    async fn update_aliases(&self, actions: &[AliasAction]) -> Result<(), SearchError> {
        let actions: Vec<Value> = actions.iter().map(AliasAction::to_json).collect();

        let response = self
            .client
            .indices()
            .update_aliases()
            .body(json!({ "actions": actions }))
            .send()
            .await
            .map_err(|e| SearchError::alias(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Update aliases request failed");
            return Err(SearchError::alias(format!(
                "Update aliases failed with status {}: {}",
                status, error_body
            )));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, name: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[name]))
            .send()
            .await
            .map_err(|e| SearchError::delete(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - index may already be gone
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Delete index request failed");
            return Err(SearchError::delete(format!(
                "Delete index failed with status {}: {}",
                status, error_body
            )));
        }

        info!(index = %name, "Index deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn reindex(&self, source: &str, dest: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .reindex()
            .wait_for_completion(true)
            .refresh(true)
            .body(json!({
                "source": { "index": source },
                "dest": { "index": dest }
            }))
            .send()
            .await
            .map_err(|e| SearchError::reindex(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Reindex request failed");
            return Err(SearchError::reindex(format!(
                "Reindex failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        if let Some(failures) = Self::reindex_failures(&body) {
            return Err(SearchError::reindex(failures));
        }

        info!(
            source = %source,
            dest = %dest,
            total = body["total"].as_u64().unwrap_or(0),
            "Reindex completed"
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(body["status"].as_str().is_some_and(|status| status != "red"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_body_pairs_action_and_source() {
        let documents = vec![
            BufferedDocument::new("code", "file", json!({ "path": "a.rs" })),
            BufferedDocument::new("code-tests", "file", json!({ "path": "b.rs" })),
        ];

        let lines = OpenSearchClient::bulk_lines(&documents);

        assert_eq!(
            lines,
            vec![
                json!({ "index": { "_index": "code" } }),
                json!({ "path": "a.rs" }),
                json!({ "index": { "_index": "code-tests" } }),
                json!({ "path": "b.rs" }),
            ]
        );
        assert_eq!(OpenSearchClient::bulk_body(&documents).len(), 4);
    }

    #[test]
    fn test_summarize_bulk_without_errors() {
        let body = json!({ "took": 12, "errors": false, "items": [] });

        let summary = OpenSearchClient::summarize_bulk(3, &body);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.took_ms, 12);
        assert!(!summary.has_failures());
    }

    #[test]
    fn test_summarize_bulk_with_item_errors() {
        let body = json!({
            "took": 5,
            "errors": true,
            "items": [
                { "index": { "_index": "code", "status": 201 } },
                {
                    "index": {
                        "_index": "code",
                        "status": 400,
                        "error": {
                            "type": "mapper_parsing_exception",
                            "reason": "failed to parse field [line]"
                        }
                    }
                }
            ]
        });

        let summary = OpenSearchClient::summarize_bulk(2, &body);

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.errors,
            vec!["mapper_parsing_exception: failed to parse field [line]".to_string()]
        );
    }

    #[test]
    fn test_reindex_failures() {
        assert_eq!(
            OpenSearchClient::reindex_failures(&json!({ "total": 10, "failures": [] })),
            None
        );
        assert_eq!(OpenSearchClient::reindex_failures(&json!({ "total": 10 })), None);

        let body = json!({
            "failures": [
                { "cause": { "type": "mapper_parsing_exception", "reason": "bad field" } }
            ]
        });
        assert_eq!(
            OpenSearchClient::reindex_failures(&body),
            Some("1 documents failed to copy, first: bad field".to_string())
        );
    }
}
