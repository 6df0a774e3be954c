//! Docker client contract
//!
//! The cleanup engine talks to Docker only through [`DockerApi`]. The real
//! implementation lives in `dockbench-cleanup` (over bollard); tests use the
//! scripted double from `dockbench-test-utils`.

use crate::error::ClientError;
use async_trait::async_trait;
use std::fmt;

/// Docker object families the client can list, inspect and remove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApiObject {
    /// Containers (must go before the images and networks they reference)
    Container,
    /// Images, addressed by id and named by their repo tags
    Image,
    /// User-defined networks
    Network,
}

impl ApiObject {
    /// All object families, in cleanup dependency order
    pub const ALL: [ApiObject; 3] = [ApiObject::Container, ApiObject::Network, ApiObject::Image];

    /// Canonical lowercase name, used as the resource kind name
    pub fn as_str(self) -> &'static str {
        match self {
            ApiObject::Container => "container",
            ApiObject::Image => "image",
            ApiObject::Network => "network",
        }
    }
}

impl fmt::Display for ApiObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider object as returned by a list or inspect call
///
/// Only the fields cleanup needs are kept. `name` is set for containers and
/// networks, `repo_tags` for images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResource {
    /// Provider identifier
    pub id: String,
    /// Single name, if the object family has one
    pub name: Option<String>,
    /// Image repo tags (`repository:tag`)
    pub repo_tags: Vec<String>,
}

impl RawResource {
    /// A named object (container or network)
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            repo_tags: Vec::new(),
        }
    }

    /// An image with the given repo tags
    pub fn tagged<I, S>(id: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: None,
            repo_tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Infrastructure client used by cleanup.
///
/// Implementations must be safe for concurrent use: one handle is shared by
/// every worker of a cleanup pass. A missing object must surface as
/// [`ClientError::NotFound`].
#[async_trait]
pub trait DockerApi: Send + Sync {
    /// List every object of the given family
    async fn list(&self, object: ApiObject) -> Result<Vec<RawResource>, ClientError>;

    /// Fetch a single object by id
    async fn inspect(&self, object: ApiObject, id: &str) -> Result<RawResource, ClientError>;

    /// Request removal of a single object by id
    async fn remove(&self, object: ApiObject, id: &str) -> Result<(), ClientError>;
}
