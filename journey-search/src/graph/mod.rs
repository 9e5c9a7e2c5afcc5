//! The raw journey search response graph.
//!
//! The search API answers with a denormalized graph: named collections of
//! ID-keyed entities that refer to each other only by ID. [`RawSearchGraph`]
//! keeps that shape (each collection an insertion-ordered map) and exposes
//! get-or-`None` lookups; nothing here follows references eagerly.
//!
//! Journeys and legs live under `data.journeySearch`, while the shared
//! reference tables (locations, carriers, transport modes, fare types) live
//! directly under `data`.

mod ids;
mod types;

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::SearchError;

pub use ids::{
    AlternativeId, CarrierId, FareId, FareTypeId, JourneyId, LegId, LocationId, SectionId,
    TransportModeId,
};
pub use types::{
    Alternative, Carrier, Fare, FareType, Journey, Leg, Location, Price, Section, TransportMode,
};

/// Reference tables stored directly under `data`.
const DATA_COLLECTIONS: [&str; 4] = ["locations", "carriers", "transportModes", "fareTypes"];

/// Collections stored under `data.journeySearch`.
const SEARCH_COLLECTIONS: [&str; 5] = ["journeys", "legs", "sections", "alternatives", "fares"];

/// A parsed journey search response.
///
/// Immutable once built; every lookup borrows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchGraph {
    #[serde(default)]
    data: SearchData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    #[serde(default)]
    journey_search: JourneySearch,
    #[serde(default)]
    locations: IndexMap<LocationId, Location>,
    #[serde(default)]
    carriers: IndexMap<CarrierId, Carrier>,
    #[serde(default)]
    transport_modes: IndexMap<TransportModeId, TransportMode>,
    #[serde(default)]
    fare_types: IndexMap<FareTypeId, FareType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct JourneySearch {
    #[serde(default)]
    journeys: IndexMap<JourneyId, Journey>,
    #[serde(default)]
    legs: IndexMap<LegId, Leg>,
    #[serde(default)]
    sections: IndexMap<SectionId, Section>,
    #[serde(default)]
    alternatives: IndexMap<AlternativeId, Alternative>,
    #[serde(default)]
    fares: IndexMap<FareId, Fare>,
}

impl RawSearchGraph {
    /// Build a graph from an already-parsed JSON value.
    ///
    /// Fails with `InvalidArgument` if the value is not a mapping of
    /// ID-keyed entity mappings, and with `Json` if an entity is present but
    /// malformed (e.g. an unparseable timestamp).
    pub fn from_value(value: Value) -> Result<Self, SearchError> {
        check_shape(&value).map_err(SearchError::InvalidArgument)?;
        serde_json::from_value(value).map_err(|e| SearchError::Json {
            message: e.to_string(),
            body: None,
        })
    }

    /// Decode a response body received from the site.
    ///
    /// Any failure here is a malformed response, reported as `Json`.
    pub fn from_json_str(body: &str) -> Result<Self, SearchError> {
        let value: Value = serde_json::from_str(body).map_err(|e| SearchError::json(&e, body))?;
        check_shape(&value).map_err(|message| SearchError::Json {
            message,
            body: Some(body.chars().take(500).collect()),
        })?;
        serde_json::from_value(value).map_err(|e| SearchError::json(&e, body))
    }

    /// Load a saved search response (e.g. the offline fixture).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SearchError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let value: Value =
            serde_json::from_str(&contents).map_err(|e| SearchError::json(&e, &contents))?;
        Self::from_value(value)
    }

    /// Journeys in the order the site returned them.
    pub fn journeys(&self) -> impl Iterator<Item = (&JourneyId, &Journey)> {
        self.data.journey_search.journeys.iter()
    }

    pub fn journey_count(&self) -> usize {
        self.data.journey_search.journeys.len()
    }

    pub fn leg(&self, id: &LegId) -> Option<&Leg> {
        self.data.journey_search.legs.get(id)
    }

    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.data.journey_search.sections.get(id)
    }

    pub fn alternative(&self, id: &AlternativeId) -> Option<&Alternative> {
        self.data.journey_search.alternatives.get(id)
    }

    pub fn fare(&self, id: &FareId) -> Option<&Fare> {
        self.data.journey_search.fares.get(id)
    }

    pub fn location(&self, id: &LocationId) -> Option<&Location> {
        self.data.locations.get(id)
    }

    pub fn carrier(&self, id: &CarrierId) -> Option<&Carrier> {
        self.data.carriers.get(id)
    }

    pub fn transport_mode(&self, id: &TransportModeId) -> Option<&TransportMode> {
        self.data.transport_modes.get(id)
    }

    pub fn fare_type(&self, id: &FareTypeId) -> Option<&FareType> {
        self.data.fare_types.get(id)
    }
}

/// Check that `value` is a mapping of ID-keyed entity mappings.
fn check_shape(value: &Value) -> Result<(), String> {
    let root = value
        .as_object()
        .ok_or("search result must be a JSON object")?;

    let Some(data) = root.get("data") else {
        return Ok(());
    };
    let data = data.as_object().ok_or("`data` must be a JSON object")?;
    check_collections(data, &DATA_COLLECTIONS)?;

    if let Some(search) = data.get("journeySearch") {
        let search = search
            .as_object()
            .ok_or("`journeySearch` must be a JSON object")?;
        check_collections(search, &SEARCH_COLLECTIONS)?;
    }

    Ok(())
}

fn check_collections(parent: &Map<String, Value>, names: &[&str]) -> Result<(), String> {
    for name in names {
        let Some(collection) = parent.get(*name) else {
            continue;
        };
        let entities = collection
            .as_object()
            .ok_or_else(|| format!("`{name}` must map IDs to entities"))?;
        if let Some((id, _)) = entities.iter().find(|(_, entity)| !entity.is_object()) {
            return Err(format!("`{name}.{id}` must be a JSON object"));
        }
    }
    Ok(())
}
