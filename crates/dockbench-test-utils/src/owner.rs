//! Owner id helpers
//!
//! Cleanup matches names against the owner id of a run, so tests need
//! owner ids that look like real ones (UUIDs) and names generated for them.

use dockbench_common::naming::{NameFormat, ResourceClass};

/// Generate a unique owner id for a test run.
///
/// # Example
///
/// ```
/// use dockbench_test_utils::owner::test_owner_id;
///
/// let owner = test_owner_id();
/// assert_eq!(owner.len(), 36);
/// ```
pub fn test_owner_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Generate a benchmark-format name owned by `owner_id`.
///
/// # Example
///
/// ```
/// use dockbench_test_utils::owner::{owned_name, test_owner_id};
///
/// let owner = test_owner_id();
/// let name = owned_name(&owner);
/// assert!(name.starts_with("s_bench_"));
/// ```
pub fn owned_name(owner_id: &str) -> String {
    NameFormat::default().generate(owner_id)
}

/// The class set used by benchmark scenarios
pub fn benchmark_classes() -> Vec<ResourceClass> {
    vec![ResourceClass::benchmark()]
}
