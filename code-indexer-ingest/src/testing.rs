//! Recording search client shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use code_indexer_repository::{SearchClient, SearchError};
use code_indexer_shared::{
    AliasAction, BufferedDocument, BulkSummary, IndexMapping, MappingResponse,
};
use serde_json::{json, Map, Value};

/// One request the fake received, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Bulk(Vec<BufferedDocument>),
    GetMapping(String),
    CreateIndex(String),
    Reindex { source: String, dest: String },
    UpdateAliases(Vec<AliasAction>),
    DeleteIndex(String),
}

/// Which request to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Bulk,
    GetMapping,
    CreateIndex,
    Reindex,
    UpdateAliases,
    DeleteIndex,
}

/// In-memory stand-in for the search engine.
///
/// It records every call and keeps just enough state for migrations to be
/// observable: created index schemas, and a live mapping that follows the
/// alias when an alias update adds it to a created index.
pub(crate) struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    live: Mutex<MappingResponse>,
    created: Mutex<HashMap<String, Value>>,
    failures: Mutex<Vec<(Op, SearchError)>>,
}

impl RecordingClient {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            live: Mutex::new(MappingResponse::empty()),
            created: Mutex::new(HashMap::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// A client whose alias resolves to `physical_index` carrying `version`
    /// in its typed mapping for `type_name`.
    pub(crate) fn with_live_index(physical_index: &str, type_name: &str, version: u64) -> Self {
        let client = Self::new();
        client.add_live_index(physical_index, type_name, version);
        client
    }

    /// Let the alias resolve to one more physical index.
    pub(crate) fn add_live_index(&self, physical_index: &str, type_name: &str, version: u64) {
        let mut mappings = Map::new();
        mappings.insert(
            type_name.to_string(),
            json!({ "_meta": { "version": version } }),
        );
        self.live
            .lock()
            .unwrap()
            .indices
            .insert(physical_index.to_string(), IndexMapping { mappings });
    }

    /// Reject every later request of kind `op` with `error`.
    pub(crate) fn fail_on(&self, op: Op, error: SearchError) {
        self.failures.lock().unwrap().push((op, error));
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// The document batches sent through `bulk`, in order.
    pub(crate) fn bulk_batches(&self) -> Vec<Vec<BufferedDocument>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Bulk(documents) => Some(documents),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, op: Op) -> usize {
        self.calls()
            .iter()
            .filter(|call| Self::op_of(call) == op)
            .count()
    }

    fn op_of(call: &Call) -> Op {
        match call {
            Call::Bulk(_) => Op::Bulk,
            Call::GetMapping(_) => Op::GetMapping,
            Call::CreateIndex(_) => Op::CreateIndex,
            Call::Reindex { .. } => Op::Reindex,
            Call::UpdateAliases(_) => Op::UpdateAliases,
            Call::DeleteIndex(_) => Op::DeleteIndex,
        }
    }

    fn record(&self, call: Call) -> Result<(), SearchError> {
        let op = Self::op_of(&call);
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().iter().find(|(o, _)| *o == op) {
            Some((_, error)) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SearchClient for RecordingClient {
    async fn bulk(&self, documents: &[BufferedDocument]) -> Result<BulkSummary, SearchError> {
        self.record(Call::Bulk(documents.to_vec()))?;
        tokio::task::yield_now().await;
        Ok(BulkSummary::all_succeeded(documents.len()))
    }

    async fn get_mapping(&self, index: &str) -> Result<MappingResponse, SearchError> {
        self.record(Call::GetMapping(index.to_string()))?;
        Ok(self.live.lock().unwrap().clone())
    }

    async fn create_index(
        &self,
        name: &str,
        _settings: &Value,
        schema: &Value,
    ) -> Result<(), SearchError> {
        self.record(Call::CreateIndex(name.to_string()))?;
        self.created
            .lock()
            .unwrap()
            .insert(name.to_string(), schema.clone());
        Ok(())
    }

    async fn update_aliases(&self, actions: &[AliasAction]) -> Result<(), SearchError> {
        self.record(Call::UpdateAliases(actions.to_vec()))?;

        let mut live = self.live.lock().unwrap();
        let created = self.created.lock().unwrap();
        for action in actions {
            match action {
                AliasAction::Remove { index, .. } | AliasAction::RemoveIndex { index } => {
                    live.indices.remove(index);
                }
                AliasAction::Add { index, .. } => {
                    let schema = created.get(index).cloned().unwrap_or_else(|| json!({}));
                    let mappings = schema.as_object().cloned().unwrap_or_default();
                    live.indices.insert(index.clone(), IndexMapping { mappings });
                }
            }
        }
        Ok(())
    }

    async fn delete_index(&self, name: &str) -> Result<(), SearchError> {
        self.record(Call::DeleteIndex(name.to_string()))
    }

    async fn reindex(&self, source: &str, dest: &str) -> Result<(), SearchError> {
        self.record(Call::Reindex {
            source: source.to_string(),
            dest: dest.to_string(),
        })
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        Ok(true)
    }
}
