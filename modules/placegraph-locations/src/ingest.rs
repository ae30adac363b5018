use std::sync::Arc;

use tracing::{info, warn};

use crate::normalize::resolve_candidate;
use crate::selector::select_candidate;
use crate::{Geocoder, IngestError, LocationStore, LocationUpsertService, UserLocationBinder};

/// Longest place name sent to the geocoder.
pub const MAX_LOCATION_NAME_LEN: usize = 200;

/// What a completed ingestion did.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The name was empty; nothing was looked up or written.
    Skipped,
    Resolved(ResolvedLocation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Id the Location was stored under, after any region rewrite.
    pub location_id: String,
    /// Container ids linked above it, nearest first.
    pub ancestors: Vec<String>,
    /// False when no User node matched, so no binding was written.
    pub bound: bool,
}

/// Resolves a free-text place name and points a user's location binding at it.
///
/// The pipeline is a chain of independent transactions: upsert, one per hierarchy
/// link, then the rebind. A failure stops the chain but leaves earlier steps
/// committed. Every write is a merge, so rerunning the whole ingestion is safe; after
/// `IngestError::Bind` the location is already stored and `rebind` alone suffices.
pub struct LocationIngestor {
    geocoder: Arc<dyn Geocoder>,
    upserts: LocationUpsertService,
    binder: UserLocationBinder,
}

impl LocationIngestor {
    pub fn new(geocoder: Arc<dyn Geocoder>, store: Arc<dyn LocationStore>) -> Self {
        Self {
            geocoder,
            upserts: LocationUpsertService::new(store.clone()),
            binder: UserLocationBinder::new(store),
        }
    }

    pub async fn resolve_and_bind_location(
        &self,
        user_id: &str,
        location_name: &str,
    ) -> Result<IngestOutcome, IngestError> {
        if location_name.trim().is_empty() {
            return Ok(IngestOutcome::Skipped);
        }
        let len = location_name.chars().count();
        if len > MAX_LOCATION_NAME_LEN {
            warn!(user_id, len, max = MAX_LOCATION_NAME_LEN, "Location name too long");
            return Err(IngestError::InvalidLocation);
        }

        let response = self.geocoder.geocode(location_name).await?;

        let feature = select_candidate(&response.features, location_name)?;
        let candidate = resolve_candidate(feature)?;
        let location_id = candidate.location.id.as_str();
        if location_id != feature.id {
            info!(from = feature.id.as_str(), to = location_id, "Multi-level match filed as region");
        }

        self.upserts.upsert_location(&candidate.location).await?;
        let ancestors = self.upserts.link_hierarchy(&candidate).await?;
        let bound = self.binder.rebind_user(user_id, location_id).await?;

        info!(user_id, location_id, bound, "Location ingested");
        Ok(IngestOutcome::Resolved(ResolvedLocation {
            location_id: location_id.to_string(),
            ancestors,
            bound,
        }))
    }

    /// Retry only the binding step for a location that is already stored.
    pub async fn rebind(&self, user_id: &str, location_id: &str) -> Result<bool, IngestError> {
        self.binder.rebind_user(user_id, location_id).await
    }
}
