//! Entity DTOs of a journey search response.
//!
//! These map directly to the JSON the search API returns. Fields are
//! `Option` wherever the site may omit them: resolution treats a missing
//! value the same as a dangling reference.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use super::ids::{
    AlternativeId, CarrierId, FareId, FareTypeId, LegId, LocationId, SectionId, TransportModeId,
};

/// One bookable journey option.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub depart_at: DateTime<FixedOffset>,
    pub arrive_at: DateTime<FixedOffset>,

    /// Legs in travel order.
    #[serde(default)]
    pub legs: Vec<LegId>,

    /// Priced sections; absent when the site has no fares for the journey.
    pub sections: Option<Vec<SectionId>>,
}

/// One directed train (or bus, ...) segment of a journey.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub departure_location: Option<LocationId>,
    pub arrival_location: Option<LocationId>,
    pub carrier: Option<CarrierId>,
    pub transport_mode: Option<TransportModeId>,
}

/// A station or stop.
#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub name: Option<String>,
}

/// A train operating company.
#[derive(Debug, Clone, Deserialize)]
pub struct Carrier {
    pub name: Option<String>,
}

/// Train, bus, coach, ...
#[derive(Debug, Clone, Deserialize)]
pub struct TransportMode {
    pub name: Option<String>,
}

/// A priced part of a journey, offering one or more alternatives.
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub alternatives: Vec<AlternativeId>,
}

/// A purchasable option for a section.
///
/// The full price is shared by every fare the alternative lists.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub full_price: Option<Price>,
    #[serde(default)]
    pub fares: Vec<FareId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub amount: Option<f64>,
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fare {
    pub fare_type: Option<FareTypeId>,
}

/// Category of a fare, e.g. second class.
#[derive(Debug, Clone, Deserialize)]
pub struct FareType {
    pub name: Option<String>,
    /// Stable code used to rank comfort class.
    pub code: Option<String>,
}
