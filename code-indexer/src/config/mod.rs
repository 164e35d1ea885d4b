//! Configuration and startup wiring for the code indexer.

mod dependencies;
mod logging;
mod settings;

pub use dependencies::{load_requests, Dependencies};
pub use logging::init_tracing;
pub use settings::IndexerConfig;
