//! Error types for the code indexer ingest.

use std::fmt;

use code_indexer_repository::SearchError;
use thiserror::Error;

/// The migration steps that can leave a migration unfinished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStep {
    /// Copying documents into the new index.
    Reindex,
    /// Moving the alias to the new index.
    AliasUpdate,
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reindex => write!(f, "reindex"),
            Self::AliasUpdate => write!(f, "alias update"),
        }
    }
}

/// Errors that can occur in the code indexer ingest.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A request to the search engine failed before anything was changed.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),

    /// A migration stopped after creating the new index but before the alias
    /// moved. The old index is still the one the alias resolves to.
    #[error("Migration of {alias} to {target_index} aborted at {step}: {source}")]
    PartialMigration {
        /// The alias being migrated.
        alias: String,
        /// The step that failed.
        step: MigrationStep,
        /// The new index, which may hold some or all of the copied documents.
        target_index: String,
        /// The underlying failure.
        #[source]
        source: SearchError,
    },

    /// The request cannot be acted on.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid component configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl IngestError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a partial migration error.
    pub fn partial_migration(
        alias: impl Into<String>,
        step: MigrationStep,
        target_index: impl Into<String>,
        source: SearchError,
    ) -> Self {
        Self::PartialMigration {
            alias: alias.into(),
            step,
            target_index: target_index.into(),
            source,
        }
    }

    /// Whether a migration stopped while the old index was still live, so the
    /// whole upgrade can be run again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PartialMigration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_migration_message() {
        let error = IngestError::partial_migration(
            "code",
            MigrationStep::Reindex,
            "code-2",
            SearchError::reindex("timed out"),
        );

        assert_eq!(
            error.to_string(),
            "Migration of code to code-2 aborted at reindex: Reindex error: timed out"
        );
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_search_error_conversion() {
        let error: IngestError = SearchError::bulk_index("rejected").into();

        assert!(matches!(error, IngestError::SearchError(_)));
        assert!(!error.is_recoverable());
        assert!(!IngestError::validation("no version").is_recoverable());
    }
}
