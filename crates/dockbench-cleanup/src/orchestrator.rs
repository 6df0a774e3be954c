//! Cleanup across resource kinds
//!
//! Resolves the requested kinds, binds the run's ownership filter and runs
//! one [`SeekAndDestroy`] pass per kind, strictly in priority order. Each pass
//! runs in its own task so a misbehaving kind cannot stop the ones after it.

use crate::engine::{PassReport, SeekAndDestroy};
use crate::ownership::OwnershipFilter;
use crate::registry::KindRegistry;
use dockbench_common::{DockerApi, OwnershipMatcher, RandomNameMatcher, ResourceClass};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// What to clean up
#[derive(Debug, Clone, Default)]
pub struct CleanupRequest {
    /// Kind names to process, `None` for every registered kind
    pub names: Option<Vec<String>>,
    /// Name classes the run created resources with
    pub owner_classes: Vec<ResourceClass>,
    /// Owner id of the run, `None` to match any run
    pub owner_id: Option<String>,
}

impl CleanupRequest {
    /// Clean every kind owned by `owner_id` with the default name format
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..Default::default()
        }
    }

    /// Restrict cleanup to the given kinds
    pub fn with_kinds<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Match names against these classes instead of the default format
    pub fn with_classes(mut self, classes: Vec<ResourceClass>) -> Self {
        self.owner_classes = classes;
        self
    }
}

/// Per-kind results of a cleanup run, in the order the kinds ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub passes: Vec<(String, PassReport)>,
    /// Kinds whose pass task panicked
    pub failed_kinds: Vec<String>,
}

impl CleanupReport {
    /// Report for a single kind
    pub fn pass(&self, kind: &str) -> Option<&PassReport> {
        self.passes
            .iter()
            .find(|(name, _)| name == kind)
            .map(|(_, report)| report)
    }

    /// Sum over every kind
    pub fn total(&self) -> PassReport {
        self.passes
            .iter()
            .fold(PassReport::default(), |mut acc, (_, r)| {
                acc.merge(*r);
                acc
            })
    }

    /// True if nothing owned by the run may be left behind
    pub fn is_clean(&self) -> bool {
        self.failed_kinds.is_empty() && self.total().residual() == 0
    }
}

/// Clean up every resource owned by the run described in `request`.
///
/// Never fails; problems are logged and show up in the report.
pub async fn cleanup(
    client: Arc<dyn DockerApi>,
    registry: &KindRegistry,
    request: CleanupRequest,
    cancel: CancellationToken,
) -> CleanupReport {
    cleanup_with_matcher(
        client,
        registry,
        request,
        Arc::new(RandomNameMatcher::default()),
        cancel,
    )
    .await
}

/// [`cleanup`] with a custom ownership matcher
pub async fn cleanup_with_matcher(
    client: Arc<dyn DockerApi>,
    registry: &KindRegistry,
    request: CleanupRequest,
    matcher: Arc<dyn OwnershipMatcher>,
    cancel: CancellationToken,
) -> CleanupReport {
    let kinds = match &request.names {
        Some(names) => registry.resolve(names.as_slice()),
        None => registry.resolve_all(),
    };
    let filter = OwnershipFilter::with_matcher(matcher, request.owner_classes, request.owner_id);

    info!(
        kinds = ?kinds.iter().map(|k| k.name()).collect::<Vec<_>>(),
        owner_id = ?filter.owner_id(),
        "Starting cleanup"
    );

    let mut report = CleanupReport::default();
    for kind in kinds {
        if cancel.is_cancelled() {
            warn!(kind = %kind.name(), "Cleanup cancelled, skipping remaining kinds");
            break;
        }

        let name = kind.name().to_string();
        let pass = SeekAndDestroy::new(kind, client.clone(), filter.clone(), cancel.clone());
        match tokio::spawn(pass.run()).await {
            Ok(pass_report) => report.passes.push((name, pass_report)),
            Err(e) => {
                error!(kind = %name, error = %e, "Cleanup pass failed");
                report.failed_kinds.push(name);
            }
        }
    }

    let total = report.total();
    info!(
        deleted = total.deleted,
        residual = total.residual(),
        "Cleanup complete"
    );
    report
}
