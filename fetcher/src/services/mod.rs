//! Fetcher services implementations

pub mod api_client;
pub mod batch_enricher;
pub mod search_source;
pub mod single_enricher;

#[cfg(test)]
pub mod tests;

pub use api_client::*;
pub use batch_enricher::*;
pub use search_source::*;
pub use single_enricher::*;
