use std::env;
use std::time::Duration;

use tracing::info;

use crate::PlacegraphError;

const DEFAULT_MAPBOX_BASE_URL: &str = "https://api.mapbox.com";
const DEFAULT_GEOCODING_TIMEOUT_SECS: u64 = 5;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Neo4j
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    // Geocoding
    pub mapbox_token: String,
    pub mapbox_base_url: String,
    pub geocoding_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    /// Fails with a clear message naming the first missing required var.
    pub fn from_env() -> Result<Self, PlacegraphError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load a minimal config for graph-only commands (no geocoding token needed).
    pub fn graph_from_env() -> Result<Self, PlacegraphError> {
        Self::from_lookup(|key| match key {
            "MAPBOX_TOKEN" => Some(env::var(key).unwrap_or_default()),
            _ => env::var(key).ok(),
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PlacegraphError> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| {
                PlacegraphError::Config(format!("{key} environment variable is required"))
            })
        };

        let timeout_secs = match lookup("GEOCODING_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                PlacegraphError::Config(format!(
                    "GEOCODING_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"
                ))
            })?,
            None => DEFAULT_GEOCODING_TIMEOUT_SECS,
        };

        Ok(Self {
            neo4j_uri: required("NEO4J_URI")?,
            neo4j_user: required("NEO4J_USER")?,
            neo4j_password: required("NEO4J_PASSWORD")?,
            mapbox_token: required("MAPBOX_TOKEN")?,
            mapbox_base_url: lookup("MAPBOX_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MAPBOX_BASE_URL.to_string()),
            geocoding_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Log the loaded configuration with secrets masked.
    pub fn log_redacted(&self) {
        info!(
            neo4j_uri = self.neo4j_uri.as_str(),
            neo4j_user = self.neo4j_user.as_str(),
            neo4j_password = redact(&self.neo4j_password),
            mapbox_token = redact(&self.mapbox_token),
            mapbox_base_url = self.mapbox_base_url.as_str(),
            geocoding_timeout_secs = self.geocoding_timeout.as_secs(),
            "Configuration loaded"
        );
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
