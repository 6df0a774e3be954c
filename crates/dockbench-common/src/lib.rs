//! dockbench-common - Shared client contract and naming
//!
//! This crate provides the pieces that both the cleanup engine and its test
//! doubles depend on, without pulling in the Docker transport.
//!
//! ## Modules
//!
//! - [`client`]: the `DockerApi` trait and raw resource types
//! - [`defaults`]: Default configuration values
//! - [`error`]: Client errors and HTTP status classification
//! - [`naming`]: Run-owned resource names and ownership matching

pub mod client;
pub mod defaults;
pub mod error;
pub mod naming;

// Re-export commonly used types
pub use client::{ApiObject, DockerApi, RawResource};
pub use error::{ClientError, classify_status};
pub use naming::{NameFormat, OwnershipMatcher, RandomNameMatcher, ResourceClass};
