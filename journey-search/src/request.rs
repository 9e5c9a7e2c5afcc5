//! Journey search request bodies.
//!
//! The search endpoint takes a fixed-shape body; only the two location URNs
//! and the departure instant vary between calls. Each body is built fresh
//! from constants, never by mutating a shared template.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Serialize;

use crate::error::SearchError;

/// Prefix of the URN the search API uses to address a location.
const LOCATION_URN_PREFIX: &str = "urn:trainline:generic:loc:";

const MAXIMUM_JOURNEYS: u8 = 5;
const CURRENCY: &str = "EUR";

/// A numeric location code as used by the site (e.g. `"3358"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCode(String);

impl LocationCode {
    /// Parse a location code.
    ///
    /// Codes are non-empty and made of ASCII letters and digits only, since
    /// they are spliced into a URN.
    pub fn parse(code: &str) -> Result<Self, SearchError> {
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(SearchError::invalid(format!(
                "location code must be a non-empty alphanumeric string, got {code:?}"
            )));
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The location URN, e.g. `urn:trainline:generic:loc:3358`.
    pub fn urn(&self) -> String {
        format!("{LOCATION_URN_PREFIX}{}", self.0)
    }
}

/// Body of a `POST /api/journey-search/` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequestBody {
    pub cards: Vec<String>,
    #[serde(rename = "type")]
    pub search_type: &'static str,
    pub maximum_journeys: u8,
    pub transport_modes: Vec<&'static str>,
    pub composition: Vec<&'static str>,
    pub requested_currency_code: &'static str,
    pub is_europe: bool,
    pub include_realtime: bool,
    pub direct_search: bool,
    pub transit_definitions: Vec<TransitDefinition>,
}

/// One direction of travel in a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitDefinition {
    pub direction: &'static str,
    pub origin: String,
    pub destination: String,
    pub journey_date: JourneyDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyDate {
    #[serde(rename = "type")]
    pub date_type: &'static str,
    /// ISO-8601 instant, e.g. `2023-12-03T15:30:00+00:00`.
    pub time: String,
}

impl SearchRequestBody {
    /// Build a single outward search departing after `departure_at`.
    pub fn single(
        origin: &LocationCode,
        destination: &LocationCode,
        departure_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            cards: Vec::new(),
            search_type: "single",
            maximum_journeys: MAXIMUM_JOURNEYS,
            transport_modes: vec!["mixed"],
            composition: vec!["through", "interchangeSplit"],
            requested_currency_code: CURRENCY,
            is_europe: true,
            include_realtime: true,
            direct_search: false,
            transit_definitions: vec![TransitDefinition {
                direction: "outward",
                origin: origin.urn(),
                destination: destination.urn(),
                journey_date: JourneyDate {
                    date_type: "departAfter",
                    time: departure_at.to_rfc3339_opts(SecondsFormat::Secs, false),
                },
            }],
        }
    }
}
