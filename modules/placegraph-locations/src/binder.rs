use std::sync::Arc;

use tracing::{info, warn};

use crate::{IngestError, LocationStore};

/// Points a user's single location binding at a new Location.
#[derive(Clone)]
pub struct UserLocationBinder {
    store: Arc<dyn LocationStore>,
}

impl UserLocationBinder {
    pub fn new(store: Arc<dyn LocationStore>) -> Self {
        Self { store }
    }

    /// Delete-then-merge in one transaction. An unknown user binds nothing and is
    /// reported as `Ok(false)`; existence of the user is not otherwise checked.
    pub async fn rebind_user(&self, user_id: &str, location_id: &str) -> Result<bool, IngestError> {
        let bound = self
            .store
            .rebind_user(user_id, location_id)
            .await
            .map_err(|source| IngestError::Bind {
                user_id: user_id.to_string(),
                location_id: location_id.to_string(),
                source,
            })?;

        if bound {
            info!(user_id, location_id, "User bound to location");
        } else {
            warn!(user_id, location_id, "No user or location matched, binding unchanged");
        }
        Ok(bound)
    }
}
