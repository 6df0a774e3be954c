//! Built-in Docker resource kinds
//!
//! Containers, networks and images differ only in which [`ApiObject`] they
//! address and how they are named, so one generic kind covers all three.

use super::{KindPolicy, Resource, ResourceKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use dockbench_common::{ApiObject, DockerApi, RawResource};
use std::sync::Arc;

/// Cleanup order of the built-in kinds.
///
/// Containers hold references to networks and images, so they go first.
pub fn default_priority(object: ApiObject) -> i32 {
    match object {
        ApiObject::Container => 0,
        ApiObject::Network => 1,
        ApiObject::Image => 2,
    }
}

/// Resource kind backed by one Docker object family
#[derive(Debug, Clone)]
pub struct DockerKind {
    object: ApiObject,
    priority: i32,
    policy: KindPolicy,
}

impl DockerKind {
    /// Create a kind with its default priority
    pub fn new(object: ApiObject, policy: KindPolicy) -> Self {
        Self {
            object,
            priority: default_priority(object),
            policy,
        }
    }

    /// Override the cleanup priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Object family this kind addresses
    pub fn object(&self) -> ApiObject {
        self.object
    }
}

#[async_trait]
impl ResourceKind for DockerKind {
    fn name(&self) -> &str {
        self.object.as_str()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn policy(&self) -> &KindPolicy {
        &self.policy
    }

    async fn list(&self, client: &Arc<dyn DockerApi>) -> Result<Vec<RawResource>> {
        client
            .list(self.object)
            .await
            .with_context(|| format!("Failed to list {}s", self.object))
    }

    fn wrap(&self, raw: RawResource, client: Arc<dyn DockerApi>) -> Box<dyn Resource> {
        Box::new(DockerResource {
            object: self.object,
            raw,
            client,
        })
    }
}

/// A listed Docker object
pub struct DockerResource {
    object: ApiObject,
    raw: RawResource,
    client: Arc<dyn DockerApi>,
}

impl DockerResource {
    /// Raw object as listed
    pub fn raw(&self) -> &RawResource {
        &self.raw
    }
}

#[async_trait]
impl Resource for DockerResource {
    fn id(&self) -> &str {
        &self.raw.id
    }

    fn names(&self) -> Vec<String> {
        match self.object {
            // The engine reports container names with a leading slash
            ApiObject::Container => self
                .raw
                .name
                .iter()
                .map(|n| n.trim_start_matches('/').to_string())
                .collect(),
            ApiObject::Network => self.raw.name.iter().cloned().collect(),
            ApiObject::Image => self
                .raw
                .repo_tags
                .iter()
                .map(|tag| match tag.split_once(':') {
                    Some((_, name)) => name.to_string(),
                    None => tag.clone(),
                })
                .collect(),
        }
    }

    async fn is_deleted(&self) -> Result<bool> {
        match self.client.inspect(self.object, &self.raw.id).await {
            Ok(_) => Ok(false),
            Err(e) if e.is_not_found() => Ok(true),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to inspect {} {}", self.object, self.raw.id)),
        }
    }

    async fn delete(&self) -> Result<()> {
        self.client
            .remove(self.object, &self.raw.id)
            .await
            .with_context(|| format!("Failed to remove {} {}", self.object, self.raw.id))
    }
}
