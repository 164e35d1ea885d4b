//! # Code Indexer Ingest
//!
//! This crate provides the two components that write into the search index:
//!
//! 1. **WriteBatcher**: buffers single-document writes and sends them as one
//!    bulk request once a fixed count is reached
//! 2. **IndexMigrator**: compares a live index's stored schema version with a
//!    target and, when stale, moves the alias to a freshly built index without
//!    readers ever seeing a half-filled one
//!
//! Both talk to the engine only through `SearchClient`.

pub mod batcher;
pub mod errors;
pub mod migrator;

#[cfg(test)]
mod testing;

pub use batcher::{BatcherConfig, WriteBatcher};
pub use errors::{IngestError, MigrationStep};
pub use migrator::{IndexMigrator, UpgradeOutcome};
