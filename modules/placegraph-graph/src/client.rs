use futures::future::BoxFuture;
use neo4rs::{ConfigBuilder, Graph, Txn};
use tracing::warn;

/// Thin wrapper around neo4rs::Graph providing connection setup and scoped transactions.
#[derive(Clone)]
pub struct GraphClient {
    pub(crate) graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given credentials.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, neo4rs::Error> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(500)
            .max_connections(10)
            .build()?;
        let graph = Graph::connect(config).await?;
        Ok(Self { graph })
    }

    /// Get a reference to the underlying neo4rs Graph.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }

    /// Run `work` inside one write transaction.
    ///
    /// Commits when `work` succeeds and rolls back when it fails. The transaction owns a
    /// pooled connection, so the connection goes back to the pool on every exit path,
    /// including a failed commit or rollback.
    pub async fn write_transaction<T, F>(&self, work: F) -> Result<T, neo4rs::Error>
    where
        F: for<'t> FnOnce(&'t mut Txn) -> BoxFuture<'t, Result<T, neo4rs::Error>>,
    {
        let mut txn = self.graph.start_txn().await?;

        match work(&mut txn).await {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed after write error");
                }
                Err(e)
            }
        }
    }
}
