use neo4rs::{query, BoltNull, BoltType, Query};
use tracing::{debug, info};

use placegraph_common::{Language, LocationNode};

use crate::GraphClient;

/// Write-side wrapper for Location nodes and their relationships.
///
/// Every method runs in its own write transaction. Nothing here spans calls, so a
/// caller chaining several writes must tolerate the earlier ones staying committed.
#[derive(Clone)]
pub struct LocationWriter {
    client: GraphClient,
}

impl LocationWriter {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Create or refresh a Location node. MERGE on id for idempotency.
    ///
    /// All nine localized names, the default name and the type are always written;
    /// a name the provider did not send is cleared. Coordinates are only written when
    /// present so a response without a center never erases stored ones.
    pub async fn upsert_location(&self, location: &LocationNode) -> Result<(), neo4rs::Error> {
        let q = upsert_location_query(location);

        self.client
            .write_transaction(|txn| Box::pin(async move { txn.run(q).await }))
            .await?;

        info!(
            location_id = location.id.as_str(),
            location_type = location.location_type.as_str(),
            has_coordinates = location.coordinates.is_some(),
            "Location node upserted"
        );
        Ok(())
    }

    /// Merge `(container)-[:CONTAINS]->(child)` between two existing Locations.
    /// Returns false when either endpoint is missing and nothing was merged.
    pub async fn merge_containment(
        &self,
        child_id: &str,
        container_id: &str,
    ) -> Result<bool, neo4rs::Error> {
        let q = query(
            "MATCH (child:Location {id: $child_id})
             MATCH (container:Location {id: $container_id})
             MERGE (container)-[:CONTAINS]->(child)
             RETURN child.id AS child_id",
        )
        .param("child_id", child_id)
        .param("container_id", container_id);

        let merged = self
            .client
            .write_transaction(|txn| {
                Box::pin(async move {
                    let mut stream = txn.execute(q).await?;
                    let row = stream.next(txn.handle()).await?;
                    Ok(row.is_some())
                })
            })
            .await?;

        debug!(child_id, container_id, merged, "Containment edge merged");
        Ok(merged)
    }

    /// Replace the user's LOCATED_IN edge with one pointing at `location_id`.
    ///
    /// Delete and merge share one transaction, and the old edge is only deleted when
    /// both the user and the target Location match. Returns whether an edge was bound.
    pub async fn rebind_user(&self, user_id: &str, location_id: &str) -> Result<bool, neo4rs::Error> {
        let q = query(
            "MATCH (user:User {id: $user_id})
             MATCH (location:Location {id: $location_id})
             OPTIONAL MATCH (user)-[old:LOCATED_IN]->(:Location)
             DELETE old
             WITH DISTINCT user, location
             MERGE (user)-[:LOCATED_IN]->(location)
             RETURN location.id AS location_id",
        )
        .param("user_id", user_id)
        .param("location_id", location_id);

        let bound = self
            .client
            .write_transaction(|txn| {
                Box::pin(async move {
                    let mut stream = txn.execute(q).await?;
                    let row = stream.next(txn.handle()).await?;
                    Ok(row.is_some())
                })
            })
            .await?;

        info!(user_id, location_id, bound, "User location rebound");
        Ok(bound)
    }
}

fn upsert_location_query(location: &LocationNode) -> Query {
    let mut cypher = String::from("MERGE (l:Location {id: $id}) SET l.name = $name, l.type = $type");
    for lang in Language::ALL {
        let prop = lang.name_property();
        cypher.push_str(&format!(", l.{prop} = ${prop}"));
    }
    if location.coordinates.is_some() {
        cypher.push_str(", l.lat = $lat, l.lng = $lng");
    }
    cypher.push_str(" RETURN l.id AS id");

    let mut q = query(&cypher)
        .param("id", location.id.as_str())
        .param("name", optional_text(location.name()))
        .param("type", location.location_type.as_str());

    for lang in Language::ALL {
        q = q.param(lang.name_property(), optional_text(location.names.get(lang)));
    }

    if let Some(coords) = location.coordinates {
        q = q.param("lat", coords.lat).param("lng", coords.lng);
    }

    q
}

fn optional_text(value: Option<&str>) -> BoltType {
    match value {
        Some(s) => s.into(),
        None => BoltType::Null(BoltNull),
    }
}
