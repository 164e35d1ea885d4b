//! Write batcher for the code indexer ingest.
//!
//! Buffers single-document writes and sends them to the search index as one
//! bulk request once a fixed number of documents has accumulated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::IngestError;
use code_indexer_repository::SearchClient;
use code_indexer_shared::{BufferedDocument, BulkSummary};

/// Configuration for the write batcher.
#[derive(Debug, Clone)]
pub struct BatcherConfig {
    /// Number of buffered documents that triggers a bulk write. Must be positive.
    pub batch_size: usize,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self { batch_size: 1000 }
    }
}

impl BatcherConfig {
    /// Create a config with a custom batch size.
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self { batch_size }
    }
}

/// Batcher that turns single-document writes into bulk requests.
///
/// Flushing is purely count based: there is no timer, so documents below the
/// threshold stay buffered until a later write fills the batch or `flush` is
/// called. Delivery is at most once. The batch leaves the buffer before the
/// bulk request is sent and is not put back if the request fails.
///
/// The buffer sits behind an async mutex that is held from the enqueue through
/// the end of the bulk request, so exactly one call flushes each batch and
/// writes arriving meanwhile start the next one.
pub struct WriteBatcher {
    client: Arc<dyn SearchClient>,
    batch_size: usize,
    pending: Mutex<Vec<BufferedDocument>>,
    cancelled: AtomicBool,
}

impl WriteBatcher {
    /// Create a new write batcher with the default configuration.
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        let config = BatcherConfig::default();
        Self {
            client,
            batch_size: config.batch_size,
            pending: Mutex::new(Vec::with_capacity(config.batch_size)),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Create a new write batcher with custom configuration.
    ///
    /// # Returns
    ///
    /// * `Err(IngestError::ConfigError)` - If the batch size is zero
    pub fn with_config(
        client: Arc<dyn SearchClient>,
        config: BatcherConfig,
    ) -> Result<Self, IngestError> {
        if config.batch_size == 0 {
            return Err(IngestError::config("batch_size must be greater than zero"));
        }

        Ok(Self {
            client,
            batch_size: config.batch_size,
            pending: Mutex::new(Vec::with_capacity(config.batch_size)),
            cancelled: AtomicBool::new(false),
        })
    }

    /// Queue a document for indexing.
    ///
    /// When this document completes a batch, the whole batch is written before
    /// the call returns.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(BulkSummary))` - This call flushed a batch
    /// * `Ok(None)` - The document was buffered, or the batcher is cancelled
    /// * `Err(IngestError::SearchError)` - The bulk request this call triggered
    ///   was rejected; the batch is dropped
    #[instrument(skip(self, document))]
    pub async fn index(
        &self,
        index: &str,
        type_name: &str,
        document: Value,
    ) -> Result<Option<BulkSummary>, IngestError> {
        if self.is_cancelled() {
            debug!("Write batcher is cancelled, skipping document");
            return Ok(None);
        }

        let mut pending = self.pending.lock().await;

        // Cancelled while waiting for the buffer
        if self.is_cancelled() {
            debug!("Write batcher is cancelled, skipping document");
            return Ok(None);
        }

        pending.push(BufferedDocument::new(index, type_name, document));
        if pending.len() < self.batch_size {
            return Ok(None);
        }

        let batch = std::mem::replace(&mut *pending, Vec::with_capacity(self.batch_size));
        self.dispatch(batch).await.map(Some)
    }

    /// Write whatever is buffered, even if it is less than a full batch.
    ///
    /// Does nothing when the buffer is empty or the batcher is cancelled.
    #[instrument(skip(self))]
    pub async fn flush(&self) -> Result<Option<BulkSummary>, IngestError> {
        if self.is_cancelled() {
            return Ok(None);
        }

        let mut pending = self.pending.lock().await;
        if pending.is_empty() || self.is_cancelled() {
            return Ok(None);
        }

        let batch = std::mem::take(&mut *pending);
        self.dispatch(batch).await.map(Some)
    }

    /// Stop all future flushes. Buffered documents are kept but never written.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            info!("Write batcher cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Number of documents waiting for the next flush.
    pub async fn pending(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    async fn dispatch(&self, batch: Vec<BufferedDocument>) -> Result<BulkSummary, IngestError> {
        let count = batch.len();

        match self.client.bulk(&batch).await {
            Ok(summary) => {
                if summary.has_failures() {
                    warn!(
                        count = count,
                        failed = summary.failed,
                        first_error = summary.errors.first().map(String::as_str).unwrap_or(""),
                        "Batch indexed with item failures"
                    );
                } else {
                    info!(count = count, took_ms = summary.took_ms, "Batch indexed documents");
                }
                Ok(summary)
            }
            Err(e) => {
                error!(error = %e, count = count, "Bulk index failed, batch dropped");
                Err(e.into())
            }
        }
    }
}
