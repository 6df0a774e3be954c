//! Resource kinds and the resources they discover
//!
//! A [`ResourceKind`] describes one type of cleanable object: its name, its
//! place in the cleanup order and the policy for deleting it. Listing a kind
//! yields raw provider objects, which the kind wraps into [`Resource`]s that
//! know how to delete themselves and check whether they are gone.

pub mod docker;

use crate::retry::RetryPolicy;
use anyhow::Result;
use async_trait::async_trait;
use dockbench_common::defaults::{
    DEFAULT_CLEANUP_THREADS, DEFAULT_DELETION_TIMEOUT_SECS, DEFAULT_LIST_ATTEMPTS,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS,
};
use dockbench_common::{DockerApi, RawResource};
use std::sync::Arc;
use std::time::Duration;

pub use docker::{DockerKind, DockerResource};

/// Deletion policy of a resource kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindPolicy {
    /// Delete attempts per resource, also the bound on failed status checks
    pub max_attempts: u32,
    /// Attempts when listing the kind
    pub list_attempts: u32,
    /// Budget for a resource to disappear after its delete request
    pub delete_timeout: Duration,
    /// Interval between status checks
    pub poll_interval: Duration,
    /// Concurrent delete workers
    pub workers: usize,
}

impl Default for KindPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            list_attempts: DEFAULT_LIST_ATTEMPTS,
            delete_timeout: Duration::from_secs(DEFAULT_DELETION_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            workers: DEFAULT_CLEANUP_THREADS,
        }
    }
}

impl KindPolicy {
    /// Retry policy for delete requests
    pub fn delete_retry(&self) -> RetryPolicy {
        RetryPolicy::immediate(self.max_attempts)
    }

    /// Retry policy for listing
    pub fn list_retry(&self) -> RetryPolicy {
        RetryPolicy::immediate(self.list_attempts)
    }
}

/// A discovered object that cleanup may delete.
///
/// Created by the listing stage of a pass and dropped once it is deleted or
/// given up on.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Provider identifier
    fn id(&self) -> &str;

    /// Every name the object goes by. Ownership is decided on these.
    fn names(&self) -> Vec<String>;

    /// Check whether the object is gone. "Not found" counts as gone.
    async fn is_deleted(&self) -> Result<bool>;

    /// Issue one delete request
    async fn delete(&self) -> Result<()>;
}

/// A type of cleanable object, registered once at startup.
#[async_trait]
pub trait ResourceKind: Send + Sync {
    /// Unique kind name, used to request the kind from the registry
    fn name(&self) -> &str;

    /// Cleanup order; lower runs first
    fn priority(&self) -> i32;

    /// Deletion policy
    fn policy(&self) -> &KindPolicy;

    /// List every object of this kind
    async fn list(&self, client: &Arc<dyn DockerApi>) -> Result<Vec<RawResource>>;

    /// Wrap a listed object
    fn wrap(&self, raw: RawResource, client: Arc<dyn DockerApi>) -> Box<dyn Resource>;
}

impl std::fmt::Debug for dyn ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceKind")
            .field("name", &self.name())
            .field("priority", &self.priority())
            .finish()
    }
}
