//! Teardown hook for benchmark runs
//!
//! A run declares which resource kinds it wants cleaned when it finishes.
//! The declaration is checked against the registry when the hook is built,
//! so a typo fails the run before anything is created.

use crate::error::RegistryError;
use crate::orchestrator::{self, CleanupReport, CleanupRequest};
use crate::registry::KindRegistry;
use dockbench_common::{DockerApi, ResourceClass};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cleans up after a run once it is done
#[derive(Debug, Clone)]
pub struct CleanupHook {
    registry: KindRegistry,
    kinds: Vec<String>,
}

impl CleanupHook {
    /// Build a hook for `kinds` (empty for every registered kind).
    pub fn new(registry: KindRegistry, kinds: Vec<String>) -> Result<Self, RegistryError> {
        registry.validate(kinds.as_slice())?;
        Ok(Self { registry, kinds })
    }

    /// Kinds the hook will clean, as declared
    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    /// Nothing to prepare before a run
    pub fn setup(&self) {
        debug!(kinds = ?self.kinds, "Cleanup hook ready");
    }

    /// Remove everything the run created.
    pub async fn cleanup(
        &self,
        client: Arc<dyn DockerApi>,
        owner_classes: Vec<ResourceClass>,
        owner_id: &str,
        cancel: CancellationToken,
    ) -> CleanupReport {
        let request = CleanupRequest {
            names: (!self.kinds.is_empty()).then(|| self.kinds.clone()),
            owner_classes,
            owner_id: Some(owner_id.to_string()),
        };
        orchestrator::cleanup(client, &self.registry, request, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleanupConfig;
    use dockbench_common::{ApiObject, RawResource};
    use dockbench_test_utils::{FakeDocker, benchmark_classes, owned_name, test_owner_id};

    fn registry() -> KindRegistry {
        KindRegistry::docker_defaults(&CleanupConfig {
            deletion_timeout_secs: 5,
            poll_interval_ms: 100,
            ..Default::default()
        })
    }

    #[test]
    fn test_rejects_unknown_kinds() {
        let err = CleanupHook::new(registry(), vec!["image".to_string(), "volume".to_string()])
            .unwrap_err();
        assert_eq!(err, RegistryError::UnknownKinds(vec!["volume".to_string()]));
        assert_eq!(err.to_string(), "Unknown resource kinds: volume");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_kinds_cleans_everything() {
        let owner = test_owner_id();
        let docker = Arc::new(
            FakeDocker::new()
                .with(ApiObject::Network, RawResource::named("n1", owned_name(&owner)))
                .with(ApiObject::Container, RawResource::named("c1", owned_name(&owner))),
        );
        let hook = CleanupHook::new(registry(), Vec::new()).unwrap();
        hook.setup();

        let report = hook
            .cleanup(docker.clone(), benchmark_classes(), &owner, CancellationToken::new())
            .await;

        assert_eq!(report.passes.len(), 3);
        assert_eq!(report.total().deleted, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_declared_kinds_only() {
        let owner = test_owner_id();
        let docker = Arc::new(
            FakeDocker::new()
                .with(ApiObject::Network, RawResource::named("n1", owned_name(&owner)))
                .with(ApiObject::Container, RawResource::named("c1", owned_name(&owner))),
        );
        let hook = CleanupHook::new(registry(), vec!["container".to_string()]).unwrap();
        assert_eq!(hook.kinds(), ["container".to_string()]);

        let report = hook
            .cleanup(docker.clone(), Vec::new(), &owner, CancellationToken::new())
            .await;

        assert_eq!(report.passes.len(), 1);
        assert_eq!(docker.remaining(ApiObject::Network), vec!["n1"]);
        assert!(docker.remaining(ApiObject::Container).is_empty());
    }
}
