//! Ownership predicate bound to a run

use dockbench_common::{OwnershipMatcher, RandomNameMatcher, ResourceClass};
use std::fmt;
use std::sync::Arc;

/// Decides whether a resource name belongs to the run being cleaned up.
///
/// Binds a matcher to the run's resource classes and owner id. An empty
/// class set falls back to the default benchmark name format.
#[derive(Clone)]
pub struct OwnershipFilter {
    matcher: Arc<dyn OwnershipMatcher>,
    classes: Vec<ResourceClass>,
    owner_id: Option<String>,
}

impl OwnershipFilter {
    /// Filter using the benchmark naming scheme, allowing trailing text
    pub fn new(classes: Vec<ResourceClass>, owner_id: Option<String>) -> Self {
        Self::with_matcher(Arc::new(RandomNameMatcher::default()), classes, owner_id)
    }

    /// Filter using a custom matcher
    pub fn with_matcher(
        matcher: Arc<dyn OwnershipMatcher>,
        classes: Vec<ResourceClass>,
        owner_id: Option<String>,
    ) -> Self {
        let classes = if classes.is_empty() {
            vec![ResourceClass::benchmark()]
        } else {
            classes
        };
        Self {
            matcher,
            classes,
            owner_id,
        }
    }

    /// True if `name` belongs to the run
    pub fn is_owned(&self, name: &str) -> bool {
        self.matcher
            .matches(name, &self.classes, self.owner_id.as_deref())
    }

    /// First of `names` that belongs to the run
    pub fn first_owned<'a>(&self, names: &'a [String]) -> Option<&'a str> {
        names
            .iter()
            .map(String::as_str)
            .find(|name| self.is_owned(name))
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }
}

impl fmt::Debug for OwnershipFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnershipFilter")
            .field("classes", &self.classes)
            .field("owner_id", &self.owner_id)
            .finish_non_exhaustive()
    }
}
