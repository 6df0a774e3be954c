//! Registry of cleanable resource kinds
//!
//! Kinds are registered once at startup. Cleanup asks the registry for the
//! kinds it should process and gets them back in priority order.

use crate::config::CleanupConfig;
use crate::error::RegistryError;
use crate::resource::{DockerKind, ResourceKind};
use dockbench_common::ApiObject;
use std::sync::Arc;
use tracing::warn;

/// Registered resource kinds, in registration order
#[derive(Debug, Default, Clone)]
pub struct KindRegistry {
    kinds: Vec<Arc<dyn ResourceKind>>,
}

impl KindRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in Docker kinds, with policies from `config`
    pub fn docker_defaults(config: &CleanupConfig) -> Self {
        let policy = config.kind_policy();
        Self {
            kinds: ApiObject::ALL
                .into_iter()
                .map(|object| {
                    Arc::new(DockerKind::new(object, policy.clone())) as Arc<dyn ResourceKind>
                })
                .collect(),
        }
    }

    /// Add a kind. Names must be unique.
    pub fn register(&mut self, kind: Arc<dyn ResourceKind>) -> Result<(), RegistryError> {
        if self.get(kind.name()).is_some() {
            return Err(RegistryError::DuplicateKind(kind.name().to_string()));
        }
        self.kinds.push(kind);
        Ok(())
    }

    /// Look up a kind by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ResourceKind>> {
        self.kinds.iter().find(|k| k.name() == name)
    }

    /// Registered kind names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.kinds.iter().map(|k| k.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Kinds matching `names`, lowest priority first.
    ///
    /// Requested names that are not registered are reported in a single
    /// warning and otherwise ignored.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Vec<Arc<dyn ResourceKind>> {
        let missing = self.missing(names);
        if !missing.is_empty() {
            warn!(missing = ?missing, "Requested resource kinds are not registered");
        }

        let mut kinds: Vec<_> = self
            .kinds
            .iter()
            .filter(|k| names.iter().any(|n| n.as_ref() == k.name()))
            .cloned()
            .collect();
        kinds.sort_by_key(|k| k.priority());
        kinds
    }

    /// Every registered kind, lowest priority first
    pub fn resolve_all(&self) -> Vec<Arc<dyn ResourceKind>> {
        let mut kinds = self.kinds.clone();
        kinds.sort_by_key(|k| k.priority());
        kinds
    }

    /// Fail if any of `names` is not registered
    pub fn validate<S: AsRef<str>>(&self, names: &[S]) -> Result<(), RegistryError> {
        let missing = self.missing(names);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::UnknownKinds(missing))
        }
    }

    fn missing<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for name in names.iter().map(AsRef::as_ref) {
            if self.get(name).is_none() && !missing.iter().any(|m| m == name) {
                missing.push(name.to_string());
            }
        }
        missing
    }
}
