//! Error types for the code indexer repository.

mod search_error;

pub use search_error::SearchError;
