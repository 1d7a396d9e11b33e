//! Upstream access for the enrichment pipeline
//!
//! Wraps the registry API behind [`UpstreamApi`] and builds candidate
//! discovery and the two enrichment strategies on top of it.

pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

pub use error::{FetchError, FetchResult};
pub use services::*;
pub use traits::*;
pub use types::*;
