//! Shared test utilities for dockbench
//!
//! This crate provides test doubles and helpers used by the cleanup crate's
//! unit and integration tests. It depends only on `dockbench-common` so it
//! can be a dev-dependency without circular dependencies.
//!
//! ## Modules
//!
//! - [`fake`]: Scripted in-memory Docker client
//! - [`logs`]: Tracing layer that records WARN and ERROR events
//! - [`owner`]: Owner id and owned-name generation

pub mod fake;
pub mod logs;
pub mod owner;

// Re-export commonly used items
pub use fake::FakeDocker;
pub use logs::LogCapture;
pub use owner::{benchmark_classes, owned_name, test_owner_id};
