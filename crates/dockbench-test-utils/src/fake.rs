//! Scripted in-memory Docker client
//!
//! `FakeDocker` stores raw resources per object family and behaves like a
//! well-mannered engine by default: `remove` drops the object, `inspect` on a
//! dropped object returns `NotFound`. Failures are scripted per call site and
//! every call is counted so tests can assert on exact call numbers.

use async_trait::async_trait;
use dockbench_common::{ApiObject, ClientError, DockerApi, RawResource, classify_status};
use std::collections::HashMap;
use std::sync::Mutex;

/// What `inspect` does for a scripted id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectBehavior {
    /// Object stays visible forever, even after a successful remove
    NeverGone,
    /// Every inspect call fails with a server error
    Broken,
    /// Object stays visible for this many more inspect calls after removal
    Linger(u32),
}

#[derive(Default)]
struct State {
    objects: HashMap<ApiObject, Vec<RawResource>>,
    removed: Vec<(ApiObject, RawResource)>,
    list_failures: HashMap<ApiObject, u32>,
    remove_failures: HashMap<String, u32>,
    inspect: HashMap<String, InspectBehavior>,
    list_calls: HashMap<ApiObject, u32>,
    remove_calls: HashMap<String, u32>,
    inspect_calls: HashMap<String, u32>,
}

/// In-memory `DockerApi` with scripted failures and call counters
#[derive(Default)]
pub struct FakeDocker {
    state: Mutex<State>,
}

impl FakeDocker {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the store
    pub fn with(self, object: ApiObject, raw: RawResource) -> Self {
        self.insert(object, raw);
        self
    }

    /// Add an object to the store
    pub fn insert(&self, object: ApiObject, raw: RawResource) {
        let mut state = self.state.lock().unwrap();
        state.objects.entry(object).or_default().push(raw);
    }

    /// Fail the next `times` list calls for `object`
    pub fn fail_list(&self, object: ApiObject, times: u32) {
        let mut state = self.state.lock().unwrap();
        state.list_failures.insert(object, times);
    }

    /// Fail the next `times` remove calls for `id` (`u32::MAX` for always)
    pub fn fail_remove(&self, id: &str, times: u32) {
        let mut state = self.state.lock().unwrap();
        state.remove_failures.insert(id.to_string(), times);
    }

    /// Script the inspect behavior for `id`
    pub fn script_inspect(&self, id: &str, behavior: InspectBehavior) {
        let mut state = self.state.lock().unwrap();
        state.inspect.insert(id.to_string(), behavior);
    }

    /// Number of list calls made for `object`
    pub fn list_calls(&self, object: ApiObject) -> u32 {
        let state = self.state.lock().unwrap();
        state.list_calls.get(&object).copied().unwrap_or(0)
    }

    /// Number of remove calls made for `id`
    pub fn remove_calls(&self, id: &str) -> u32 {
        let state = self.state.lock().unwrap();
        state.remove_calls.get(id).copied().unwrap_or(0)
    }

    /// Number of remove calls made across all ids
    pub fn total_remove_calls(&self) -> u32 {
        let state = self.state.lock().unwrap();
        state.remove_calls.values().sum()
    }

    /// Number of inspect calls made for `id`
    pub fn inspect_calls(&self, id: &str) -> u32 {
        let state = self.state.lock().unwrap();
        state.inspect_calls.get(id).copied().unwrap_or(0)
    }

    /// Ids still present for `object`
    pub fn remaining(&self, object: ApiObject) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&object)
            .map(|objs| objs.iter().map(|o| o.id.clone()).collect())
            .unwrap_or_default()
    }

    /// Ids removed so far, in removal order
    pub fn removed_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.removed.iter().map(|(_, raw)| raw.id.clone()).collect()
    }
}

fn take_failure<K>(failures: &mut HashMap<K, u32>, key: &K) -> bool
where
    K: std::hash::Hash + Eq,
{
    match failures.get_mut(key) {
        None | Some(&mut 0) => false,
        Some(&mut u32::MAX) => true,
        Some(n) => {
            *n -= 1;
            true
        }
    }
}

#[async_trait]
impl DockerApi for FakeDocker {
    async fn list(&self, object: ApiObject) -> Result<Vec<RawResource>, ClientError> {
        let mut state = self.state.lock().unwrap();
        *state.list_calls.entry(object).or_default() += 1;
        if take_failure(&mut state.list_failures, &object) {
            return Err(ClientError::Transport("connection reset".to_string()));
        }
        Ok(state.objects.get(&object).cloned().unwrap_or_default())
    }

    async fn inspect(&self, object: ApiObject, id: &str) -> Result<RawResource, ClientError> {
        let mut state = self.state.lock().unwrap();
        *state.inspect_calls.entry(id.to_string()).or_default() += 1;

        match state.inspect.get(id).copied() {
            Some(InspectBehavior::Broken) => {
                return Err(classify_status(500, "inspect is broken"));
            }
            Some(InspectBehavior::NeverGone) => {
                return Ok(RawResource {
                    id: id.to_string(),
                    ..Default::default()
                });
            }
            Some(InspectBehavior::Linger(remaining)) => {
                if remaining > 0 {
                    state
                        .inspect
                        .insert(id.to_string(), InspectBehavior::Linger(remaining - 1));
                    return Ok(RawResource {
                        id: id.to_string(),
                        ..Default::default()
                    });
                }
            }
            None => {}
        }

        state
            .objects
            .get(&object)
            .and_then(|objs| objs.iter().find(|o| o.id == id))
            .cloned()
            .ok_or_else(|| classify_status(404, format!("No such {object}: {id}")))
    }

    async fn remove(&self, object: ApiObject, id: &str) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        *state.remove_calls.entry(id.to_string()).or_default() += 1;
        if take_failure(&mut state.remove_failures, &id.to_string()) {
            return Err(classify_status(500, format!("cannot remove {object} {id}")));
        }

        let objects = state.objects.entry(object).or_default();
        match objects.iter().position(|o| o.id == id) {
            Some(pos) => {
                let raw = objects.remove(pos);
                state.removed.push((object, raw));
                Ok(())
            }
            None => Err(classify_status(404, format!("No such {object}: {id}"))),
        }
    }
}
