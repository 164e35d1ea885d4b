//! Dependency initialization and wiring for the code indexer.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::config::IndexerConfig;
use crate::IndexerError;
use code_indexer_ingest::{BatcherConfig, IndexMigrator, UpgradeOutcome, WriteBatcher};
use code_indexer_repository::{OpenSearchClient, SearchClient};
use code_indexer_shared::IndexCreationRequest;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Checks and migrates index versions at startup.
    pub migrator: IndexMigrator,
    /// Batches steady-state document writes.
    pub batcher: Arc<WriteBatcher>,
}

impl Dependencies {
    /// Connect to OpenSearch and build the indexer components.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexerError)` - If the cluster is unreachable or unhealthy
    pub async fn new(config: &IndexerConfig) -> Result<Self, IndexerError> {
        info!(
            opensearch_url = %config.opensearch_url,
            batch_size = config.batch_size,
            "Initializing dependencies"
        );

        let search_client = OpenSearchClient::new(&config.opensearch_url)
            .await
            .map_err(|e| {
                IndexerError::config(format!("Failed to create OpenSearch client: {}", e))
            })?;

        // Verify OpenSearch is reachable
        let healthy = search_client
            .health_check()
            .await
            .map_err(|e| {
                IndexerError::config(format!("OpenSearch health check failed: {}", e))
            })?;

        if !healthy {
            return Err(IndexerError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        Self::with_client(Arc::new(search_client), config)
    }

    /// Build the indexer components on top of an existing client.
    pub fn with_client(
        client: Arc<dyn SearchClient>,
        config: &IndexerConfig,
    ) -> Result<Self, IndexerError> {
        let batcher = WriteBatcher::with_config(
            client.clone(),
            BatcherConfig::with_batch_size(config.batch_size),
        )?;

        Ok(Self {
            migrator: IndexMigrator::new(client),
            batcher: Arc::new(batcher),
        })
    }

    /// Upgrade every index in `requests`, one after another.
    ///
    /// Stops at the first failed upgrade. Indices left with a residual old
    /// index are reported in the outcomes, not treated as failures.
    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub async fn upgrade_all(
        &self,
        requests: Vec<IndexCreationRequest>,
    ) -> Result<Vec<UpgradeOutcome>, IndexerError> {
        let mut outcomes = Vec::with_capacity(requests.len());

        for request in requests {
            let alias = request.index.clone();
            match self.migrator.try_upgrade(request).await {
                Ok(outcome) => {
                    if let UpgradeOutcome::CleanupPending { residual_index, .. } = &outcome {
                        warn!(
                            alias = %alias,
                            residual_index = %residual_index,
                            "Old index needs manual cleanup"
                        );
                    }
                    outcomes.push(outcome);
                }
                Err(e) => {
                    error!(
                        alias = %alias,
                        error = %e,
                        recoverable = e.is_recoverable(),
                        "Index upgrade failed"
                    );
                    return Err(e.into());
                }
            }
        }

        Ok(outcomes)
    }
}

/// Load the index creation requests from a JSON array file.
pub fn load_requests(path: &Path) -> Result<Vec<IndexCreationRequest>, IndexerError> {
    let raw = fs::read_to_string(path)?;
    let requests: Vec<IndexCreationRequest> = serde_json::from_str(&raw)?;
    Ok(requests)
}
