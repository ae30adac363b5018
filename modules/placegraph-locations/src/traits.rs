// Trait seams for the ingestion pipeline.
//
// Geocoder wraps the outbound place lookup, LocationStore the three graph writes.
// Both have production impls here and in-memory mocks in `testing`, so the
// pipeline runs deterministically without network or database.

use anyhow::Result;
use async_trait::async_trait;

use mapbox_client::{GeocodeResponse, MapboxClient};
use placegraph_common::LocationNode;
use placegraph_graph::LocationWriter;

// ---------------------------------------------------------------------------
// Geocoder
// ---------------------------------------------------------------------------

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up ranked candidates for a free-text place name.
    async fn geocode(&self, name: &str) -> mapbox_client::Result<GeocodeResponse>;
}

#[async_trait]
impl Geocoder for MapboxClient {
    async fn geocode(&self, name: &str) -> mapbox_client::Result<GeocodeResponse> {
        MapboxClient::geocode(self, name).await
    }
}

// ---------------------------------------------------------------------------
// LocationStore
// ---------------------------------------------------------------------------

/// Graph writes used by ingestion. Each call is its own transaction.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Create or refresh a Location keyed by id. Absent coordinates keep stored ones.
    async fn upsert_location(&self, location: &LocationNode) -> Result<()>;

    /// Record that `container_id` contains `child_id`. Both Locations must exist.
    async fn merge_containment(&self, child_id: &str, container_id: &str) -> Result<()>;

    /// Replace the user's binding with one to `location_id`.
    /// Returns false, leaving any old binding in place, when user or location don't match.
    async fn rebind_user(&self, user_id: &str, location_id: &str) -> Result<bool>;
}

#[async_trait]
impl LocationStore for LocationWriter {
    async fn upsert_location(&self, location: &LocationNode) -> Result<()> {
        Ok(LocationWriter::upsert_location(self, location).await?)
    }

    async fn merge_containment(&self, child_id: &str, container_id: &str) -> Result<()> {
        let merged = LocationWriter::merge_containment(self, child_id, container_id).await?;
        if !merged {
            anyhow::bail!("containment endpoints missing: {child_id} in {container_id}");
        }
        Ok(())
    }

    async fn rebind_user(&self, user_id: &str, location_id: &str) -> Result<bool> {
        Ok(LocationWriter::rebind_user(self, user_id, location_id).await?)
    }
}
