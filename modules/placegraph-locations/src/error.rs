use std::fmt;

use thiserror::Error;

use mapbox_client::MapboxError;

/// Message shown to callers for unresolvable input.
pub const INVALID_LOCATION_MESSAGE: &str = "locationName is invalid";

/// Step of the ingestion pipeline an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Geocode,
    Select,
    Upsert,
    Hierarchy,
    Bind,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IngestStage::Geocode => "geocode",
            IngestStage::Select => "select",
            IngestStage::Upsert => "upsert",
            IngestStage::Hierarchy => "hierarchy",
            IngestStage::Bind => "bind",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{}", INVALID_LOCATION_MESSAGE)]
    InvalidLocation,

    #[error("Geocoding failed: {0}")]
    Geocoding(#[from] MapboxError),

    #[error("Failed to upsert location {location_id}: {source}")]
    Upsert {
        location_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to link {child_id} into {container_id}: {source}")]
    Hierarchy {
        child_id: String,
        container_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The location and its hierarchy are committed; only the user binding is stale.
    #[error("Failed to bind user {user_id} to {location_id}: {source}")]
    Bind {
        user_id: String,
        location_id: String,
        #[source]
        source: anyhow::Error,
    },
}

impl IngestError {
    pub fn stage(&self) -> IngestStage {
        match self {
            IngestError::Geocoding(_) => IngestStage::Geocode,
            IngestError::InvalidLocation => IngestStage::Select,
            IngestError::Upsert { .. } => IngestStage::Upsert,
            IngestError::Hierarchy { .. } => IngestStage::Hierarchy,
            IngestError::Bind { .. } => IngestStage::Bind,
        }
    }

    /// True for bad input the caller can fix by sending a different name.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            IngestError::InvalidLocation | IngestError::Geocoding(MapboxError::InvalidQuery(_))
        )
    }

    /// Message safe to show to an end user. Infrastructure details stay in logs.
    pub fn user_message(&self) -> &'static str {
        if self.is_user_error() {
            INVALID_LOCATION_MESSAGE
        } else {
            "location could not be saved, please try again"
        }
    }
}
