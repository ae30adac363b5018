use mapbox_client::Feature;

use crate::IngestError;

/// Pick the candidate to persist for `query`.
///
/// A candidate whose `matching_place_name` equals the query exactly wins; when several
/// do, the last one in provider order is taken. Otherwise the top-ranked candidate is
/// used. The pick must carry at least one place type.
pub fn select_candidate<'a>(features: &'a [Feature], query: &str) -> Result<&'a Feature, IngestError> {
    let exact = features
        .iter()
        .rev()
        .find(|f| f.matching_place_name.as_deref() == Some(query));

    let selected = exact.or_else(|| features.first()).ok_or(IngestError::InvalidLocation)?;

    if selected.place_type.is_empty() {
        return Err(IngestError::InvalidLocation);
    }
    Ok(selected)
}
