//! OpenSearch implementation of the search client.

mod client;

pub use client::OpenSearchClient;
