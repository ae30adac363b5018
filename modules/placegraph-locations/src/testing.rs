// Test mocks for the ingestion pipeline.
//
// - MockGeocoder (Geocoder): HashMap-based name -> response, records every call
// - MockLocationStore (LocationStore): stateful in-memory graph with the same merge
//   semantics as the Neo4j writer, an ordered write log, and failure injection
//
// Plus builders for provider features.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use mapbox_client::{Feature, GeocodeResponse, MapboxError};
use placegraph_common::LocationNode;

use crate::traits::{Geocoder, LocationStore};

// ---------------------------------------------------------------------------
// Feature builders
// ---------------------------------------------------------------------------

/// A provider feature with an English name and a single place type taken from the id.
pub fn feature(id: &str, name_en: &str) -> Feature {
    Feature {
        id: id.to_string(),
        place_type: vec![id.split('.').next().unwrap_or_default().to_string()],
        text_en: Some(name_en.to_string()),
        ..Default::default()
    }
}

pub fn response(features: Vec<Feature>) -> GeocodeResponse {
    GeocodeResponse { features }
}

// ---------------------------------------------------------------------------
// MockGeocoder
// ---------------------------------------------------------------------------

/// Returns registered responses by exact name. Unregistered names fail as transport errors.
pub struct MockGeocoder {
    responses: HashMap<String, GeocodeResponse>,
    failures: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_name(mut self, name: &str, response: GeocodeResponse) -> Self {
        self.responses.insert(name.to_string(), response);
        self
    }

    /// Make lookups for `name` fail with a transport error.
    pub fn failing_on(mut self, name: &str, message: &str) -> Self {
        self.failures.insert(name.to_string(), message.to_string());
        self
    }

    /// Names looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, name: &str) -> mapbox_client::Result<GeocodeResponse> {
        self.calls.lock().unwrap().push(name.to_string());

        if let Some(message) = self.failures.get(name) {
            return Err(MapboxError::Transport(message.clone()));
        }
        self.responses
            .get(name)
            .cloned()
            .ok_or_else(|| MapboxError::Transport(format!("no mock response for '{name}'")))
    }
}

// ---------------------------------------------------------------------------
// MockLocationStore
// ---------------------------------------------------------------------------

/// One successful write, in the order the store saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Upsert(String),
    Contain { child: String, container: String },
    Rebind { user: String, location: String },
}

#[derive(Default)]
struct MockLocationStoreInner {
    locations: HashMap<String, LocationNode>,
    /// (child_id, container_id)
    containment: BTreeSet<(String, String)>,
    users: HashSet<String>,
    /// user_id -> location_id
    bindings: HashMap<String, String>,
    ops: Vec<StoreOp>,
    fail_upsert_of: HashSet<String>,
    fail_containment_of: HashSet<String>,
    fail_rebinds: bool,
}

/// Stateful in-memory graph. Thread-safe via interior Mutex, so each call behaves
/// like one serialized transaction.
pub struct MockLocationStore {
    inner: Mutex<MockLocationStoreInner>,
}

impl MockLocationStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MockLocationStoreInner::default()),
        }
    }

    /// Register a User node so bindings can attach to it.
    pub fn with_user(self, user_id: &str) -> Self {
        self.inner.lock().unwrap().users.insert(user_id.to_string());
        self
    }

    /// Make upserting `location_id` fail.
    pub fn failing_upsert_of(self, location_id: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .fail_upsert_of
            .insert(location_id.to_string());
        self
    }

    /// Make linking `child_id` to its container fail.
    pub fn failing_containment_of(self, child_id: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .fail_containment_of
            .insert(child_id.to_string());
        self
    }

    /// Make every rebind fail until `heal` is called.
    pub fn failing_rebinds(self) -> Self {
        self.inner.lock().unwrap().fail_rebinds = true;
        self
    }

    /// Clear all injected failures.
    pub fn heal(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_upsert_of.clear();
        inner.fail_containment_of.clear();
        inner.fail_rebinds = false;
    }

    pub fn location(&self, id: &str) -> Option<LocationNode> {
        self.inner.lock().unwrap().locations.get(id).cloned()
    }

    pub fn location_count(&self) -> usize {
        self.inner.lock().unwrap().locations.len()
    }

    /// Containment edges as (child_id, container_id), sorted.
    pub fn containment_edges(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().containment.iter().cloned().collect()
    }

    pub fn binding_of(&self, user_id: &str) -> Option<String> {
        self.inner.lock().unwrap().bindings.get(user_id).cloned()
    }

    /// Number of bindings leaving `user_id`; a map entry means at most one.
    pub fn binding_count(&self, user_id: &str) -> usize {
        usize::from(self.inner.lock().unwrap().bindings.contains_key(user_id))
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.inner.lock().unwrap().ops.clone()
    }

    pub fn containment_ops(&self) -> Vec<(String, String)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                StoreOp::Contain { child, container } => Some((child, container)),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockLocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationStore for MockLocationStore {
    async fn upsert_location(&self, location: &LocationNode) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_upsert_of.contains(&location.id) {
            bail!("mock upsert failure for {}", location.id);
        }

        let coordinates = location.coordinates.or_else(|| {
            inner
                .locations
                .get(&location.id)
                .and_then(|existing| existing.coordinates)
        });
        inner.locations.insert(
            location.id.clone(),
            LocationNode {
                coordinates,
                ..location.clone()
            },
        );
        inner.ops.push(StoreOp::Upsert(location.id.clone()));
        Ok(())
    }

    async fn merge_containment(&self, child_id: &str, container_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_containment_of.contains(child_id) {
            bail!("mock containment failure for {child_id}");
        }
        if !inner.locations.contains_key(child_id) || !inner.locations.contains_key(container_id) {
            bail!("containment endpoints missing: {child_id} in {container_id}");
        }

        inner
            .containment
            .insert((child_id.to_string(), container_id.to_string()));
        inner.ops.push(StoreOp::Contain {
            child: child_id.to_string(),
            container: container_id.to_string(),
        });
        Ok(())
    }

    async fn rebind_user(&self, user_id: &str, location_id: &str) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_rebinds {
            bail!("mock rebind failure for {user_id}");
        }
        if !inner.users.contains(user_id) || !inner.locations.contains_key(location_id) {
            return Ok(false);
        }

        inner
            .bindings
            .insert(user_id.to_string(), location_id.to_string());
        inner.ops.push(StoreOp::Rebind {
            user: user_id.to_string(),
            location: location_id.to_string(),
        });
        Ok(true)
    }
}
