//! Cleanup against a real Docker engine
//!
//! These tests create networks on the engine reachable through `DOCKER_HOST`
//! (or the local socket) and check that cleanup removes exactly the ones
//! owned by the run.
//!
//! Run with:
//! ```
//! cargo test --test docker_integration -- --ignored --nocapture
//! ```


use docker_test_helpers::*;
use dockbench_cleanup::{BollardDocker, CleanupConfig, CleanupRequest, KindRegistry, cleanup};
use dockbench_common::{ApiObject, DockerApi};
use dockbench_test_utils::{owned_name, test_owner_id};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn config() -> CleanupConfig {
    CleanupConfig {
        deletion_timeout_secs: 30,
        poll_interval_ms: 200,
        cleanup_threads: 4,
        ..Default::default()
    }
}

#[tokio::test]
#[ignore]
async fn test_owned_networks_removed() {
    let fixtures = fixture_client();
    let owner = test_owner_id();

    let mut owned_ids = Vec::new();
    for _ in 0..3 {
        owned_ids.push(create_network(&fixtures, &owned_name(&owner)).await);
    }
    let foreign_name = owned_name(&test_owner_id());
    let foreign_id = create_network(&fixtures, &foreign_name).await;

    let client: Arc<dyn DockerApi> =
        Arc::new(BollardDocker::connect(&get_test_endpoint()).expect("connect"));
    let registry = KindRegistry::docker_defaults(&config());

    let report = cleanup(
        client.clone(),
        &registry,
        CleanupRequest::for_owner(owner).with_kinds(["network"]),
        CancellationToken::new(),
    )
    .await;

    let listed = client.list(ApiObject::Network).await.expect("list networks");
    let remaining: Vec<&str> = listed.iter().map(|n| n.id.as_str()).collect();
    remove_network_quietly(&fixtures, &foreign_id).await;

    assert!(report.is_clean(), "report: {report:?}");
    assert_eq!(report.total().deleted, 3);
    for id in &owned_ids {
        assert!(!remaining.contains(&id.as_str()), "network {id} still present");
    }
    assert!(
        remaining.contains(&foreign_id.as_str()),
        "foreign network {foreign_name} was removed"
    );
}

#[tokio::test]
#[ignore]
async fn test_inspect_missing_is_not_found() {
    let client = BollardDocker::connect(&get_test_endpoint()).expect("connect");
    let err = client
        .inspect(ApiObject::Network, "dockbench-does-not-exist")
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
}
