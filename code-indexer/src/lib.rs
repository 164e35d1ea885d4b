//! # Code Indexer
//!
//! Main library for the code indexer.
//!
//! This crate provides the configuration, logging setup and dependency wiring
//! for running index upgrades at startup and batched writes afterwards.

pub mod config;

pub use config::{init_tracing, load_requests, Dependencies, IndexerConfig};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] code_indexer_ingest::IngestError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] code_indexer_repository::SearchError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed JSON input.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl IndexerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
