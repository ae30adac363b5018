use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PlacegraphError;

// --- Languages ---

/// Languages a Location carries display names for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    De,
    Fr,
    Nl,
    It,
    Es,
    Pt,
    Pl,
    Ru,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::En,
        Language::De,
        Language::Fr,
        Language::Nl,
        Language::It,
        Language::Es,
        Language::Pt,
        Language::Pl,
        Language::Ru,
    ];

    /// ISO 639-1 code as sent to the geocoder.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
            Language::Fr => "fr",
            Language::Nl => "nl",
            Language::It => "it",
            Language::Es => "es",
            Language::Pt => "pt",
            Language::Pl => "pl",
            Language::Ru => "ru",
        }
    }

    /// Node property holding the name in this language, e.g. `nameDE`.
    pub fn name_property(self) -> &'static str {
        match self {
            Language::En => "nameEN",
            Language::De => "nameDE",
            Language::Fr => "nameFR",
            Language::Nl => "nameNL",
            Language::It => "nameIT",
            Language::Es => "nameES",
            Language::Pt => "namePT",
            Language::Pl => "namePL",
            Language::Ru => "nameRU",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Display names keyed by language. Languages the provider had no name for are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedNames(BTreeMap<Language, String>);

impl LocalizedNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, lang: Language, name: impl Into<String>) {
        self.0.insert(lang, name.into());
    }

    pub fn get(&self, lang: Language) -> Option<&str> {
        self.0.get(&lang).map(String::as_str)
    }

    /// The default name is the English one.
    pub fn default_name(&self) -> Option<&str> {
        self.get(Language::En)
    }
}

// --- Location Node ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lng: f64,
    pub lat: f64,
}

/// A geocoded place, keyed by the provider id `<type>.<local id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationNode {
    pub id: String,
    pub location_type: String,
    pub names: LocalizedNames,
    pub coordinates: Option<Coordinates>,
}

impl LocationNode {
    pub fn name(&self) -> Option<&str> {
        self.names.default_name()
    }
}

/// Split a provider id into its `(type, local id)` halves.
pub fn split_location_id(id: &str) -> Result<(&str, &str), PlacegraphError> {
    match id.split_once('.') {
        Some((kind, local)) if !kind.is_empty() && !local.is_empty() => Ok((kind, local)),
        _ => Err(PlacegraphError::Validation(format!(
            "location id '{id}' is not of the form <type>.<id>"
        ))),
    }
}

/// Lowercase type tag of a provider id, e.g. `Region.12` -> `region`.
pub fn location_type_of(id: &str) -> Result<String, PlacegraphError> {
    let (kind, _) = split_location_id(id)?;
    Ok(kind.to_lowercase())
}
