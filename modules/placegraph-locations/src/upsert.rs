use std::sync::Arc;

use tracing::{debug, info};

use placegraph_common::LocationNode;

use crate::{IngestError, LocationStore, ResolvedCandidate};

/// Persists Locations and the containment chain between them.
#[derive(Clone)]
pub struct LocationUpsertService {
    store: Arc<dyn LocationStore>,
}

impl LocationUpsertService {
    pub fn new(store: Arc<dyn LocationStore>) -> Self {
        Self { store }
    }

    /// Create or refresh one Location. No edges are touched.
    pub async fn upsert_location(&self, location: &LocationNode) -> Result<(), IngestError> {
        self.store
            .upsert_location(location)
            .await
            .map_err(|source| IngestError::Upsert {
                location_id: location.id.clone(),
                source,
            })
    }

    /// Walk the candidate's context nearest-first, upserting each container and linking
    /// it to the previous link in the chain. The first link is the candidate itself.
    ///
    /// Strictly sequential: each edge depends on the previous node being written. The
    /// first failure aborts the rest of the chain. Returns the linked container ids.
    pub async fn link_hierarchy(&self, candidate: &ResolvedCandidate) -> Result<Vec<String>, IngestError> {
        let mut linked = Vec::with_capacity(candidate.context.len());
        let mut child = &candidate.location;

        for container in &candidate.context {
            self.upsert_location(container).await?;

            self.store
                .merge_containment(&child.id, &container.id)
                .await
                .map_err(|source| IngestError::Hierarchy {
                    child_id: child.id.clone(),
                    container_id: container.id.clone(),
                    source,
                })?;
            debug!(child_id = child.id.as_str(), container_id = container.id.as_str(), "Linked");

            linked.push(container.id.clone());
            child = container;
        }

        if !linked.is_empty() {
            info!(
                location_id = candidate.location.id.as_str(),
                depth = linked.len(),
                "Location hierarchy linked"
            );
        }
        Ok(linked)
    }
}
