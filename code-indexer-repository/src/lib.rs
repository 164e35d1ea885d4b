//! # Code Indexer Repository
//!
//! This crate defines the `SearchClient` capability the indexer components
//! depend on, the errors it reports, and a concrete implementation backed by
//! OpenSearch.

pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use errors::SearchError;
pub use interfaces::SearchClient;
pub use opensearch::OpenSearchClient;
