//! Docker engine adapter over bollard

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{InspectContainerOptions, ListContainersOptions, RemoveContainerOptions};
use bollard::image::{ListImagesOptions, RemoveImageOptions};
use bollard::network::{InspectNetworkOptions, ListNetworksOptions};
use dockbench_common::{ApiObject, ClientError, DockerApi, RawResource, classify_status};
use tracing::debug;

/// Seconds before a request to the engine is abandoned
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Where to reach the Docker engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerEndpoint {
    /// Platform defaults (`DOCKER_HOST` or the local socket)
    Local,
    /// Unix socket at the given path
    Unix(String),
    /// Plain HTTP, `tcp://host:port` or `http://host:port`
    Http(String),
}

impl DockerEndpoint {
    /// Parse a `DOCKER_HOST` style address.
    pub fn parse(host: &str) -> Option<Self> {
        if let Some(path) = host.strip_prefix("unix://") {
            return (!path.is_empty()).then(|| DockerEndpoint::Unix(path.to_string()));
        }
        if host.starts_with('/') {
            return Some(DockerEndpoint::Unix(host.to_string()));
        }
        if host.starts_with("tcp://") || host.starts_with("http://") {
            return Some(DockerEndpoint::Http(host.to_string()));
        }
        None
    }
}

/// `DockerApi` backed by a bollard client
#[derive(Debug, Clone)]
pub struct BollardDocker {
    docker: Docker,
}

impl BollardDocker {
    /// Connect to the engine at `endpoint`.
    ///
    /// Connecting does not touch the engine; the first request does.
    pub fn connect(endpoint: &DockerEndpoint) -> Result<Self, ClientError> {
        let docker = match endpoint {
            DockerEndpoint::Local => Docker::connect_with_local_defaults(),
            DockerEndpoint::Unix(path) => {
                Docker::connect_with_unix(path, REQUEST_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
            }
            DockerEndpoint::Http(addr) => {
                Docker::connect_with_http(addr, REQUEST_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
            }
        }
        .map_err(classify_bollard)?;

        debug!(endpoint = ?endpoint, "Docker client created");
        Ok(Self { docker })
    }
}

/// Map a bollard error onto the client error categories.
fn classify_bollard(e: bollard::errors::Error) -> ClientError {
    match e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } => classify_status(status_code, message),
        other => ClientError::Transport(other.to_string()),
    }
}

#[async_trait]
impl DockerApi for BollardDocker {
    async fn list(&self, object: ApiObject) -> Result<Vec<RawResource>, ClientError> {
        match object {
            ApiObject::Container => {
                let options = ListContainersOptions::<String> {
                    all: true,
                    ..Default::default()
                };
                let containers = self
                    .docker
                    .list_containers(Some(options))
                    .await
                    .map_err(classify_bollard)?;
                Ok(containers
                    .into_iter()
                    .filter_map(|c| {
                        let id = c.id?;
                        let name = c.names.and_then(|names| names.into_iter().next());
                        Some(RawResource {
                            id,
                            name,
                            repo_tags: Vec::new(),
                        })
                    })
                    .collect())
            }
            ApiObject::Image => {
                let options = ListImagesOptions::<String> {
                    all: false,
                    ..Default::default()
                };
                let images = self
                    .docker
                    .list_images(Some(options))
                    .await
                    .map_err(classify_bollard)?;
                Ok(images
                    .into_iter()
                    .map(|i| RawResource::tagged(i.id, i.repo_tags))
                    .collect())
            }
            ApiObject::Network => {
                let networks = self
                    .docker
                    .list_networks(None::<ListNetworksOptions<String>>)
                    .await
                    .map_err(classify_bollard)?;
                Ok(networks
                    .into_iter()
                    .filter_map(|n| {
                        Some(RawResource {
                            id: n.id?,
                            name: n.name,
                            repo_tags: Vec::new(),
                        })
                    })
                    .collect())
            }
        }
    }

    async fn inspect(&self, object: ApiObject, id: &str) -> Result<RawResource, ClientError> {
        match object {
            ApiObject::Container => {
                let c = self
                    .docker
                    .inspect_container(id, None::<InspectContainerOptions>)
                    .await
                    .map_err(classify_bollard)?;
                Ok(RawResource {
                    id: c.id.unwrap_or_else(|| id.to_string()),
                    name: c.name,
                    repo_tags: Vec::new(),
                })
            }
            ApiObject::Image => {
                let i = self
                    .docker
                    .inspect_image(id)
                    .await
                    .map_err(classify_bollard)?;
                Ok(RawResource::tagged(
                    i.id.unwrap_or_else(|| id.to_string()),
                    i.repo_tags.unwrap_or_default(),
                ))
            }
            ApiObject::Network => {
                let n = self
                    .docker
                    .inspect_network(id, None::<InspectNetworkOptions<String>>)
                    .await
                    .map_err(classify_bollard)?;
                Ok(RawResource {
                    id: n.id.unwrap_or_else(|| id.to_string()),
                    name: n.name,
                    repo_tags: Vec::new(),
                })
            }
        }
    }

    async fn remove(&self, object: ApiObject, id: &str) -> Result<(), ClientError> {
        match object {
            ApiObject::Container => {
                let options = RemoveContainerOptions {
                    force: true,
                    v: true,
                    ..Default::default()
                };
                self.docker
                    .remove_container(id, Some(options))
                    .await
                    .map_err(classify_bollard)
            }
            ApiObject::Image => {
                let options = RemoveImageOptions {
                    force: true,
                    ..Default::default()
                };
                self.docker
                    .remove_image(id, Some(options), None)
                    .await
                    .map(|_| ())
                    .map_err(classify_bollard)
            }
            ApiObject::Network => self
                .docker
                .remove_network(id)
                .await
                .map_err(classify_bollard),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoints() {
        assert_eq!(
            DockerEndpoint::parse("unix:///var/run/docker.sock"),
            Some(DockerEndpoint::Unix("/var/run/docker.sock".to_string()))
        );
        assert_eq!(
            DockerEndpoint::parse("/run/user/1000/docker.sock"),
            Some(DockerEndpoint::Unix("/run/user/1000/docker.sock".to_string()))
        );
        assert_eq!(
            DockerEndpoint::parse("tcp://127.0.0.1:2375"),
            Some(DockerEndpoint::Http("tcp://127.0.0.1:2375".to_string()))
        );
        assert_eq!(
            DockerEndpoint::parse("http://docker:2375"),
            Some(DockerEndpoint::Http("http://docker:2375".to_string()))
        );
        assert_eq!(DockerEndpoint::parse("unix://"), None);
        assert_eq!(DockerEndpoint::parse("ssh://host"), None);
        assert_eq!(DockerEndpoint::parse("docker"), None);
    }

    #[test]
    fn test_classify_server_errors() {
        let not_found = classify_bollard(bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message: "No such network: abc".to_string(),
        });
        assert!(not_found.is_not_found());

        let conflict = classify_bollard(bollard::errors::Error::DockerResponseServerError {
            status_code: 409,
            message: "network has active endpoints".to_string(),
        });
        assert!(matches!(conflict, ClientError::Conflict(_)));
    }

    #[test]
    fn test_classify_transport_errors() {
        let err = classify_bollard(bollard::errors::Error::RequestTimeoutError);
        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[test]
    fn test_connect_http_is_lazy() {
        let endpoint = DockerEndpoint::Http("tcp://127.0.0.1:1".to_string());
        assert!(BollardDocker::connect(&endpoint).is_ok());
    }
}
