//! dockbench-cleanup - Seek-and-destroy cleanup of benchmark resources
//!
//! Benchmark runs create containers, networks and images whose names embed
//! the run's owner id. This crate finds what a run left behind and deletes it
//! kind by kind, in dependency order, with a bounded pool of workers per kind.
//!
//! ## Modules
//!
//! - [`config`]: Cleanup configuration and per-kind policies
//! - [`docker`]: bollard adapter for the Docker engine
//! - [`engine`]: The seek-and-destroy pass over one kind
//! - [`hook`]: Teardown hook for benchmark runs
//! - [`orchestrator`]: Cleanup across every requested kind
//! - [`ownership`]: Ownership filter bound to a run
//! - [`registry`]: Registry of resource kinds
//! - [`resource`]: Resource kind and resource traits, built-in Docker kinds
//! - [`retry`]: Retry policy for list and delete calls

pub mod config;
pub mod docker;
pub mod engine;
pub mod error;
pub mod hook;
pub mod orchestrator;
pub mod ownership;
pub mod registry;
pub mod resource;
pub mod retry;

pub use config::CleanupConfig;
pub use docker::{BollardDocker, DockerEndpoint};
pub use engine::{PassReport, SeekAndDestroy};
pub use error::{ConfigError, RegistryError};
pub use hook::CleanupHook;
pub use orchestrator::{CleanupReport, CleanupRequest, cleanup};
pub use ownership::OwnershipFilter;
pub use registry::KindRegistry;
pub use resource::{KindPolicy, Resource, ResourceKind};
