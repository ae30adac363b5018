use serde::{Deserialize, Serialize};

/// Languages requested from the places endpoint, in request order.
pub const LANGUAGES: [&str; 9] = ["en", "de", "fr", "nl", "it", "es", "pt", "pl", "ru"];

/// Feature types requested from the places endpoint.
pub const FEATURE_TYPES: [&str; 3] = ["region", "place", "country"];

/// Body of a `mapbox.places` forward geocoding response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A single ranked candidate. Context entries reuse this shape without `context`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feature {
    /// Empty when the provider omitted it; rejected only if the feature is used.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub place_type: Vec<String>,
    #[serde(default)]
    pub matching_place_name: Option<String>,
    /// `[lng, lat]`
    #[serde(default)]
    pub center: Option<Vec<f64>>,
    #[serde(default)]
    pub context: Vec<Feature>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_de: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_fr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_nl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_it: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_es: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_pt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_pl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_ru: Option<String>,
}

impl Feature {
    /// Localized display text for a language code such as `"de"`.
    pub fn text(&self, lang: &str) -> Option<&str> {
        let text = match lang {
            "en" => &self.text_en,
            "de" => &self.text_de,
            "fr" => &self.text_fr,
            "nl" => &self.text_nl,
            "it" => &self.text_it,
            "es" => &self.text_es,
            "pt" => &self.text_pt,
            "pl" => &self.text_pl,
            "ru" => &self.text_ru,
            _ => return None,
        };
        text.as_deref()
    }

    /// Center as `(lng, lat)`, only when the provider sent both components.
    pub fn center_point(&self) -> Option<(f64, f64)> {
        match self.center.as_deref() {
            Some([lng, lat, ..]) if lng.is_finite() && lat.is_finite() => Some((*lng, *lat)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_feature() {
        let body = r#"{
            "features": [{
                "id": "place.123",
                "place_type": ["place"],
                "text_en": "Berlin",
                "text_ru": "Берлин",
                "center": [13.38, 52.52],
                "context": [{"id": "country.9", "text_en": "Germany"}]
            }]
        }"#;

        let resp: GeocodeResponse = serde_json::from_str(body).unwrap();
        let feature = &resp.features[0];
        assert_eq!(feature.text("en"), Some("Berlin"));
        assert_eq!(feature.text("ru"), Some("Берлин"));
        assert_eq!(feature.text("de"), None);
        assert_eq!(feature.center_point(), Some((13.38, 52.52)));
        assert!(feature.matching_place_name.is_none());
        assert_eq!(feature.context[0].id, "country.9");
        assert!(feature.context[0].place_type.is_empty());
    }

    #[test]
    fn feature_without_id_still_decodes() {
        let body = r#"{
            "features": [
                {"id": "place.1", "place_type": ["place"], "text_en": "Berlin"},
                {"place_type": ["place"], "text_en": "Berlin"}
            ]
        }"#;

        let resp: GeocodeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.features.len(), 2);
        assert_eq!(resp.features[0].id, "place.1");
        assert!(resp.features[1].id.is_empty());
    }

    #[test]
    fn missing_features_is_empty_list() {
        let resp: GeocodeResponse = serde_json::from_str(r#"{"type": "FeatureCollection"}"#).unwrap();
        assert!(resp.features.is_empty());
    }

    #[test]
    fn incomplete_center_is_ignored() {
        let feature = Feature {
            center: Some(vec![13.38]),
            ..Default::default()
        };
        assert_eq!(feature.center_point(), None);

        let feature = Feature {
            center: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(feature.center_point(), None);
    }
}
