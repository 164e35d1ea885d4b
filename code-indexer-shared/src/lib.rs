//! # Code Indexer Shared
//!
//! Plain data types passed between the code indexer crates: index creation
//! requests, buffered documents, mapping responses, alias actions and bulk
//! summaries.

mod alias;
mod bulk;
mod document;
mod mapping;
mod request;

pub use alias::AliasAction;
pub use bulk::BulkSummary;
pub use document::BufferedDocument;
pub use mapping::{IndexMapping, MappingMeta, MappingResponse, TypeMapping};
pub use request::IndexCreationRequest;
