//! Index migrator for the code indexer ingest.
//!
//! Brings the index behind an alias up to the schema version a caller asks
//! for. A stale index is replaced in four steps, each awaited before the next
//! is issued:
//!
//! 1. create `{alias}-{version}` with the new settings and schema
//! 2. reindex the live index into it
//! 3. move the alias over in one atomic alias update
//! 4. delete the old index
//!
//! A live index that is a concrete index named like the alias is removed by
//! the alias update itself, so step 4 is skipped for it.
//!
//! The alias only moves once the new index holds every document, so readers
//! never see a partially filled index, and the old index is only deleted after
//! the alias has left it.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::errors::{IngestError, MigrationStep};
use code_indexer_repository::{SearchClient, SearchError};
use code_indexer_shared::{AliasAction, IndexCreationRequest};

/// What `try_upgrade` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// The live index already has the target version (or a newer one).
    UpToDate { index: String, version: u64 },
    /// Nothing existed behind the alias, so a fresh index was created for it.
    Created {
        alias: String,
        index: String,
        version: u64,
    },
    /// The alias now points at a new index and the old one is gone.
    Migrated {
        alias: String,
        from_index: String,
        to_index: String,
        from_version: u64,
        to_version: u64,
    },
    /// The alias now points at a new index, but the old index could not be
    /// deleted. Reads and writes are correct; the old index wastes storage
    /// until someone removes it.
    CleanupPending {
        alias: String,
        to_index: String,
        residual_index: String,
        reason: SearchError,
    },
}

impl UpgradeOutcome {
    pub fn is_cleanup_pending(&self) -> bool {
        matches!(self, Self::CleanupPending { .. })
    }

    /// Whether the alias resolves to a different index than before.
    pub fn alias_moved(&self) -> bool {
        !matches!(self, Self::UpToDate { .. })
    }
}

/// Migrates indices whose stored schema version is behind the requested one.
///
/// The migrator keeps no state between calls. Two upgrades of the same alias
/// must not run at the same time; callers serialize them.
pub struct IndexMigrator {
    client: Arc<dyn SearchClient>,
}

impl IndexMigrator {
    /// Create a new index migrator with the given client.
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self { client }
    }

    /// Upgrade the index behind `request.index` if its stored version is
    /// older than the version embedded in `request.schema`.
    ///
    /// # Returns
    ///
    /// * `Ok(UpgradeOutcome)` - Up to date, created, migrated, or migrated with
    ///   the old index left behind
    /// * `Err(IngestError::ValidationError)` - The request carries no target
    ///   version; nothing was sent
    /// * `Err(IngestError::SearchError)` - Reading the mapping or creating the
    ///   new index failed; the live index is untouched
    /// * `Err(IngestError::PartialMigration)` - Reindex or alias update failed;
    ///   the alias still points at the old index
    #[instrument(
        skip(self, request),
        fields(alias = %request.index, type_name = %request.type_name)
    )]
    pub async fn try_upgrade(
        &self,
        request: IndexCreationRequest,
    ) -> Result<UpgradeOutcome, IngestError> {
        let target_version = request.target_version().ok_or_else(|| {
            IngestError::validation(format!(
                "schema for {} carries no _meta.version",
                request.index
            ))
        })?;

        info!(target_version = target_version, "Checking index version");

        let mapping = self.client.get_mapping(&request.index).await?;
        if mapping.indices.len() > 1 {
            warn!(
                indices = ?mapping.indices.keys().collect::<Vec<_>>(),
                "Alias resolves to several indices, only the stalest one is migrated"
            );
        }

        let Some((live_index, stored_version)) = mapping.stored_version(&request.type_name)
        else {
            return self.bootstrap(&request, target_version).await;
        };
        let live_index = live_index.to_string();

        if stored_version >= target_version {
            info!(
                index = %live_index,
                version = stored_version,
                "Index version is up to date"
            );
            return Ok(UpgradeOutcome::UpToDate {
                index: live_index,
                version: stored_version,
            });
        }

        let new_index = request.versioned_index_name(target_version);
        if new_index == live_index {
            return Err(IngestError::validation(format!(
                "live index {} reports version {} but is named for version {}",
                live_index, stored_version, target_version
            )));
        }

        info!(
            from_index = %live_index,
            to_index = %new_index,
            from_version = stored_version,
            to_version = target_version,
            "Migrating index"
        );

        self.create_index(&new_index, &request).await?;

        self.client
            .reindex(&live_index, &new_index)
            .await
            .map_err(|e| self.abort(&request, MigrationStep::Reindex, &new_index, e))?;

        let actions = Self::swap_actions(&request.index, &live_index, &new_index);
        self.client
            .update_aliases(&actions)
            .await
            .map_err(|e| self.abort(&request, MigrationStep::AliasUpdate, &new_index, e))?;

        info!(alias = %request.index, index = %new_index, "Alias moved to new index");

        // A concrete index named like the alias was removed by the alias
        // update; its name now belongs to the alias.
        if live_index == request.index {
            info!(from_index = %live_index, to_index = %new_index, "Index migration completed");
            return Ok(UpgradeOutcome::Migrated {
                alias: request.index,
                from_index: live_index,
                to_index: new_index,
                from_version: stored_version,
                to_version: target_version,
            });
        }

        if let Err(e) = self.client.delete_index(&live_index).await {
            warn!(
                index = %live_index,
                error = %e,
                "Migration finished but the old index could not be deleted"
            );
            return Ok(UpgradeOutcome::CleanupPending {
                alias: request.index,
                to_index: new_index,
                residual_index: live_index,
                reason: e,
            });
        }

        info!(from_index = %live_index, to_index = %new_index, "Index migration completed");

        Ok(UpgradeOutcome::Migrated {
            alias: request.index,
            from_index: live_index,
            to_index: new_index,
            from_version: stored_version,
            to_version: target_version,
        })
    }

    /// Create the index for an alias that resolves to nothing yet.
    async fn bootstrap(
        &self,
        request: &IndexCreationRequest,
        version: u64,
    ) -> Result<UpgradeOutcome, IngestError> {
        let new_index = request.versioned_index_name(version);
        info!(index = %new_index, "No live index, creating one");

        self.create_index(&new_index, request).await?;
        self.client
            .update_aliases(&[AliasAction::add(&new_index, &request.index)])
            .await?;

        Ok(UpgradeOutcome::Created {
            alias: request.index.clone(),
            index: new_index,
            version,
        })
    }

    /// Create `name`, accepting one left behind by an earlier aborted attempt.
    async fn create_index(
        &self,
        name: &str,
        request: &IndexCreationRequest,
    ) -> Result<(), IngestError> {
        match self
            .client
            .create_index(name, &request.settings, &request.schema)
            .await
        {
            Ok(()) => Ok(()),
            Err(SearchError::IndexAlreadyExists(_)) => {
                debug!(index = %name, "Index already exists, reusing it");
                Ok(())
            }
            Err(e) => {
                error!(index = %name, error = %e, "Failed to create index");
                Err(e.into())
            }
        }
    }

    /// Alias actions that move `alias` from `live_index` to `new_index`.
    ///
    /// A live index that is itself named like the alias is a concrete index,
    /// not an alias target; it has to be removed in the same update so the
    /// name can become an alias.
    fn swap_actions(alias: &str, live_index: &str, new_index: &str) -> Vec<AliasAction> {
        if live_index == alias {
            vec![
                AliasAction::add(new_index, alias),
                AliasAction::remove_index(live_index),
            ]
        } else {
            vec![
                AliasAction::remove(live_index, alias),
                AliasAction::add(new_index, alias),
            ]
        }
    }

    fn abort(
        &self,
        request: &IndexCreationRequest,
        step: MigrationStep,
        new_index: &str,
        source: SearchError,
    ) -> IngestError {
        error!(
            step = %step,
            index = %new_index,
            error = %source,
            "Index migration aborted, old index is still live"
        );
        IngestError::partial_migration(&request.index, step, new_index, source)
    }
}
