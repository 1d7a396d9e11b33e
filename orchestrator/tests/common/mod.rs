//! Common test utilities and infrastructure
//!
//! Shared fixtures and builders used across the orchestrator test suites.

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::{FakeCompany, TestFixtures};
pub use helpers::{OrchestratorBuilder, TestHelpers};
