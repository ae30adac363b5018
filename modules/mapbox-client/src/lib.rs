pub mod error;
pub mod types;

pub use error::{MapboxError, Result};
pub use types::{Feature, GeocodeResponse, FEATURE_TYPES, LANGUAGES};

use std::time::Duration;

pub struct MapboxClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl MapboxClient {
    /// Build a client with an explicit access token. `timeout` bounds the whole request.
    pub fn new(token: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Forward-geocode a free-text place name against `mapbox.places`, restricted to
    /// regions, places and countries, with names localized into every supported language.
    pub async fn geocode(&self, name: &str) -> Result<GeocodeResponse> {
        if name.trim().is_empty() {
            return Err(MapboxError::InvalidQuery("place name is empty".to_string()));
        }

        let url = format!(
            "{}/geocoding/v5/mapbox.places/{}.json",
            self.base_url,
            urlencoding::encode(name)
        );
        let types = FEATURE_TYPES.join(",");
        let language = LANGUAGES.join(",");

        tracing::debug!(name, "Geocoding place name");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("access_token", self.token.as_str()),
                ("types", types.as_str()),
                ("language", language.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MapboxError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        tracing::debug!(name, body = %body, "Geocoding response");

        let parsed: GeocodeResponse = serde_json::from_str(&body)?;
        tracing::info!(name, candidates = parsed.features.len(), "Geocoded place name");
        Ok(parsed)
    }
}
