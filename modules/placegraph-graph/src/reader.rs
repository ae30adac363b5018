use neo4rs::{query, Row};

use placegraph_common::{Coordinates, Language, LocalizedNames, LocationNode};

use crate::GraphClient;

/// Read-only queries over Locations and user bindings.
#[derive(Clone)]
pub struct LocationReader {
    client: GraphClient,
}

impl LocationReader {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Get a Location by id. Returns None if not found.
    pub async fn get_location(&self, id: &str) -> Result<Option<LocationNode>, neo4rs::Error> {
        let cypher = format!(
            "MATCH (l:Location {{id: $id}}) RETURN {}",
            location_projection("l")
        );
        let q = query(&cypher).param("id", id);

        let mut stream = self.client.graph.execute(q).await?;
        Ok(stream.next().await?.and_then(|row| location_from_row(&row)))
    }

    /// The Location a user is currently bound to, if any.
    pub async fn user_location(&self, user_id: &str) -> Result<Option<LocationNode>, neo4rs::Error> {
        let cypher = format!(
            "MATCH (:User {{id: $user_id}})-[:LOCATED_IN]->(l:Location) RETURN {}",
            location_projection("l")
        );
        let q = query(&cypher).param("user_id", user_id);

        let mut stream = self.client.graph.execute(q).await?;
        Ok(stream.next().await?.and_then(|row| location_from_row(&row)))
    }

    /// Number of LOCATED_IN edges leaving a user. Should never exceed one.
    pub async fn user_binding_count(&self, user_id: &str) -> Result<i64, neo4rs::Error> {
        let q = query(
            "MATCH (:User {id: $user_id})-[r:LOCATED_IN]->(:Location)
             RETURN count(r) AS bindings",
        )
        .param("user_id", user_id);

        let mut stream = self.client.graph.execute(q).await?;
        match stream.next().await? {
            Some(row) => Ok(row.get("bindings").unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Containers of a Location, nearest first (e.g. region, then country).
    pub async fn ancestors(&self, id: &str) -> Result<Vec<LocationNode>, neo4rs::Error> {
        let cypher = format!(
            "MATCH path = (:Location {{id: $id}})<-[:CONTAINS*1..]-(a:Location)
             WITH a, min(length(path)) AS depth
             RETURN {}, depth
             ORDER BY depth",
            location_projection("a")
        );
        let q = query(&cypher).param("id", id);

        let mut stream = self.client.graph.execute(q).await?;
        let mut ancestors = Vec::new();
        while let Some(row) = stream.next().await? {
            if let Some(location) = location_from_row(&row) {
                ancestors.push(location);
            }
        }
        Ok(ancestors)
    }
}

fn location_projection(var: &str) -> String {
    let mut columns = vec![
        format!("{var}.id AS id"),
        format!("{var}.type AS type"),
        format!("{var}.lat AS lat"),
        format!("{var}.lng AS lng"),
    ];
    for lang in Language::ALL {
        let prop = lang.name_property();
        columns.push(format!("{var}.{prop} AS {prop}"));
    }
    columns.join(", ")
}

fn location_from_row(row: &Row) -> Option<LocationNode> {
    let id: String = row.get("id").ok()?;

    let mut names = LocalizedNames::new();
    for lang in Language::ALL {
        if let Ok(Some(name)) = row.get::<Option<String>>(lang.name_property()) {
            names.insert(lang, name);
        }
    }

    let lat: Option<f64> = row.get("lat").ok().flatten();
    let lng: Option<f64> = row.get("lng").ok().flatten();
    let coordinates = match (lng, lat) {
        (Some(lng), Some(lat)) => Some(Coordinates { lng, lat }),
        _ => None,
    };

    Some(LocationNode {
        location_type: row.get("type").unwrap_or_default(),
        id,
        names,
        coordinates,
    })
}
