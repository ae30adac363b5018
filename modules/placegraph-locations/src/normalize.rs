use mapbox_client::Feature;
use placegraph_common::{
    location_type_of, split_location_id, Coordinates, Language, LocalizedNames, LocationNode,
};

use crate::IngestError;

/// The selected candidate and its containment chain, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCandidate {
    pub location: LocationNode,
    /// Containers in provider order, nearest first.
    pub context: Vec<LocationNode>,
}

/// Canonical id for the selected candidate.
///
/// Several place types mean the provider matched more than one administrative level,
/// so the id is filed under `region` keeping its local part: `place.55` -> `region.55`.
pub fn normalize_id(feature: &Feature) -> Result<String, IngestError> {
    let (_, local) = split_location_id(&feature.id).map_err(|_| IngestError::InvalidLocation)?;

    if feature.place_type.len() > 1 {
        Ok(format!("region.{local}"))
    } else {
        Ok(feature.id.clone())
    }
}

/// Build the Location attributes for a feature stored under `id`.
pub fn to_location_node(feature: &Feature, id: String) -> Result<LocationNode, IngestError> {
    let location_type = location_type_of(&id).map_err(|_| IngestError::InvalidLocation)?;

    let mut names = LocalizedNames::new();
    for lang in Language::ALL {
        if let Some(text) = feature.text(lang.code()) {
            names.insert(lang, text);
        }
    }

    Ok(LocationNode {
        id,
        location_type,
        names,
        coordinates: feature
            .center_point()
            .map(|(lng, lat)| Coordinates { lng, lat }),
    })
}

/// Normalize the selected feature and its context chain. Context ids are kept as sent.
pub fn resolve_candidate(feature: &Feature) -> Result<ResolvedCandidate, IngestError> {
    let location = to_location_node(feature, normalize_id(feature)?)?;

    let context = feature
        .context
        .iter()
        .map(|ctx| to_location_node(ctx, ctx.id.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResolvedCandidate { location, context })
}
