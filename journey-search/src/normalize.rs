//! Flattening a search response graph into journey results.
//!
//! Each journey in the response refers to legs, locations, carriers and
//! fares only by ID. Normalization resolves those references into flat
//! [`JourneyResult`] records. A dangling reference anywhere yields `None`
//! at that point instead of an error, so partially broken responses still
//! produce usable results.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::SearchError;
use crate::graph::{Alternative, Journey, Leg, LegId, LocationId, RawSearchGraph};

/// Prefix the site puts in front of SNCF fare type codes.
const FARE_TYPE_URN_PREFIX: &str = "urn:trainline:sncf:fare:";

/// Fare type code → comfort class rank.
const COMFORT_CLASSES: [(&str, u8); 3] = [
    ("25ee315b0ac945adce4b429e19396c94", 1),
    ("56d92abf88e6201bf1cd8def58047753", 2),
    ("e182f7e04f64f0f4a4ac475a42b2ea9d", 3),
];

/// One journey option, flattened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JourneyResult {
    pub departure_station: Option<String>,
    pub departure_at: DateTime<FixedOffset>,
    pub arrival_station: Option<String>,
    pub arrival_at: DateTime<FixedOffset>,
    /// Carrier name of each leg, in travel order.
    pub service_agencies: Vec<Option<String>>,
    pub duration_in_minutes: i64,
    pub changeovers: usize,
    /// Transport mode name of each leg, in travel order.
    pub products: Vec<Option<String>>,
    pub fares: Vec<FareOption>,
}

/// A purchasable fare for a journey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareOption {
    pub name: Option<String>,
    pub price_in_cents: Option<i64>,
    pub currency: Option<String>,
    pub comfort_class: Option<u8>,
}

/// Look up the comfort class rank of a fare type code.
///
/// Accepts the bare code or the `urn:trainline:sncf:fare:` URN form.
pub fn comfort_class(code: &str) -> Option<u8> {
    let code = code.strip_prefix(FARE_TYPE_URN_PREFIX).unwrap_or(code);
    COMFORT_CLASSES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|&(_, rank)| rank)
}

/// Normalize every journey of `graph`, preserving response order.
pub fn normalize(graph: &RawSearchGraph) -> Vec<JourneyResult> {
    let results: Vec<JourneyResult> = graph
        .journeys()
        .map(|(_, journey)| normalize_journey(graph, journey))
        .collect();

    debug!(journeys = results.len(), "normalized search response");
    results
}

/// Normalize an untyped JSON search response.
///
/// Fails with `InvalidArgument` if `value` is not a mapping of ID-keyed
/// entity mappings.
pub fn normalize_value(value: Value) -> Result<Vec<JourneyResult>, SearchError> {
    let graph = RawSearchGraph::from_value(value)?;
    Ok(normalize(&graph))
}

fn normalize_journey(graph: &RawSearchGraph, journey: &Journey) -> JourneyResult {
    let legs: Vec<Option<&Leg>> = journey.legs.iter().map(|id| graph.leg(id)).collect();

    let departure_station = journey
        .legs
        .first()
        .and_then(|id| station_name(graph, id, |leg| leg.departure_location.as_ref()));
    let arrival_station = journey
        .legs
        .last()
        .and_then(|id| station_name(graph, id, |leg| leg.arrival_location.as_ref()));

    let service_agencies = legs
        .iter()
        .map(|&leg| {
            leg.and_then(|leg| leg.carrier.as_ref())
                .and_then(|id| graph.carrier(id))
                .and_then(|carrier| carrier.name.clone())
        })
        .collect();

    let products = legs
        .iter()
        .map(|&leg| {
            leg.and_then(|leg| leg.transport_mode.as_ref())
                .and_then(|id| graph.transport_mode(id))
                .and_then(|mode| mode.name.clone())
        })
        .collect();

    JourneyResult {
        departure_station,
        departure_at: journey.depart_at,
        arrival_station,
        arrival_at: journey.arrive_at,
        service_agencies,
        duration_in_minutes: (journey.arrive_at - journey.depart_at).num_minutes(),
        changeovers: journey.legs.len().saturating_sub(1),
        products,
        fares: fares(graph, journey),
    }
}

/// Two-hop lookup: leg → location ID → location name.
fn station_name(
    graph: &RawSearchGraph,
    leg_id: &LegId,
    location_of: impl Fn(&Leg) -> Option<&LocationId>,
) -> Option<String> {
    let leg = graph.leg(leg_id)?;
    let location = graph.location(location_of(leg)?)?;
    location.name.clone()
}

fn fares(graph: &RawSearchGraph, journey: &Journey) -> Vec<FareOption> {
    journey
        .sections
        .iter()
        .flatten()
        .filter_map(|id| graph.section(id))
        .flat_map(|section| section.alternatives.iter())
        .filter_map(|id| graph.alternative(id))
        .flat_map(|alternative| alternative_fares(graph, alternative))
        .collect()
}

/// One fare option per fare listed by `alternative`, sharing its price.
fn alternative_fares(graph: &RawSearchGraph, alternative: &Alternative) -> Vec<FareOption> {
    let price = alternative.full_price.as_ref();
    let price_in_cents = price
        .and_then(|p| p.amount)
        .map(|amount| (amount * 100.0).round() as i64);
    let currency = price.and_then(|p| p.currency_code.clone());

    alternative
        .fares
        .iter()
        .map(|id| {
            let fare_type = graph
                .fare(id)
                .and_then(|fare| fare.fare_type.as_ref())
                .and_then(|id| graph.fare_type(id));

            FareOption {
                name: fare_type.and_then(|t| t.name.clone()),
                price_in_cents,
                currency: currency.clone(),
                comfort_class: fare_type
                    .and_then(|t| t.code.as_deref())
                    .and_then(comfort_class),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;

    use super::*;

    fn fixture() -> RawSearchGraph {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/journey-search-result.json");
        RawSearchGraph::from_path(path).unwrap()
    }

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn fare(name: &str, cents: i64, class: u8) -> FareOption {
        FareOption {
            name: Some(name.to_string()),
            price_in_cents: Some(cents),
            currency: Some("EUR".to_string()),
            comfort_class: Some(class),
        }
    }

    fn names(names: &[&str]) -> Vec<Option<String>> {
        names.iter().map(|n| Some(n.to_string())).collect()
    }

    #[test]
    fn fixture_normalizes_to_expected_results() {
        let results = normalize(&fixture());

        assert_eq!(
            results,
            vec![
                JourneyResult {
                    departure_station: Some("Lille-Europe".into()),
                    departure_at: at("2023-12-16T05:58:00+01:00"),
                    arrival_station: Some("Marseille St-Charles".into()),
                    arrival_at: at("2023-12-16T10:46:00+01:00"),
                    service_agencies: names(&["SNCF"]),
                    duration_in_minutes: 288,
                    changeovers: 0,
                    products: names(&["Train"]),
                    fares: vec![
                        fare("SECONDE", 9700, 1),
                        fare("PREMIERE", 10_300, 2),
                        fare("BUSINESS PREMIERE", 20_400, 3),
                    ],
                },
                JourneyResult {
                    departure_station: Some("Lille-Europe".into()),
                    departure_at: at("2023-12-16T07:24:00+01:00"),
                    arrival_station: Some("Marseille St-Charles".into()),
                    arrival_at: at("2023-12-16T12:24:00+01:00"),
                    service_agencies: names(&["SNCF"]),
                    duration_in_minutes: 300,
                    changeovers: 0,
                    products: names(&["Train"]),
                    fares: vec![fare("SECONDE", 9700, 1), fare("PREMIERE", 10_300, 2)],
                },
                JourneyResult {
                    departure_station: Some("Lille-Europe".into()),
                    departure_at: at("2023-12-16T07:24:00+01:00"),
                    arrival_station: Some("Marseille St-Charles".into()),
                    arrival_at: at("2023-12-16T12:24:00+01:00"),
                    service_agencies: names(&["SNCF"]),
                    duration_in_minutes: 300,
                    changeovers: 0,
                    products: names(&["Train"]),
                    fares: vec![fare("BUSINESS PREMIERE", 20_400, 3)],
                },
                JourneyResult {
                    departure_station: Some("Lille-Flandres".into()),
                    departure_at: at("2023-12-16T08:12:00+01:00"),
                    arrival_station: Some("Marseille St-Charles".into()),
                    arrival_at: at("2023-12-16T13:14:00+01:00"),
                    service_agencies: names(&["SNCF", "SNCF"]),
                    duration_in_minutes: 302,
                    changeovers: 1,
                    products: names(&["Train", "Train"]),
                    fares: vec![
                        fare("SECONDE", 11_600, 1),
                        fare("PREMIERE", 20_200, 2),
                        fare("BUSINESS PREMIERE", 26_200, 3),
                    ],
                },
            ]
        );
    }

    #[test]
    fn comfort_class_table() {
        assert_eq!(comfort_class("25ee315b0ac945adce4b429e19396c94"), Some(1));
        assert_eq!(comfort_class("56d92abf88e6201bf1cd8def58047753"), Some(2));
        assert_eq!(comfort_class("e182f7e04f64f0f4a4ac475a42b2ea9d"), Some(3));
        assert_eq!(
            comfort_class("urn:trainline:sncf:fare:56d92abf88e6201bf1cd8def58047753"),
            Some(2)
        );
        assert_eq!(comfort_class("0123456789abcdef0123456789abcdef"), None);
        assert_eq!(comfort_class(""), None);
    }

    #[test]
    fn empty_journeys_give_empty_results() {
        let graph = RawSearchGraph::from_value(json!({
            "data": { "journeySearch": { "journeys": {} } }
        }))
        .unwrap();
        assert!(normalize(&graph).is_empty());
    }

    #[test]
    fn rejects_non_mapping_input() {
        let err = normalize_value(json!("")).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
    }

    #[test]
    fn dangling_references_resolve_to_none() {
        let results = normalize_value(json!({
            "data": {
                "journeySearch": {
                    "journeys": { "j": {
                        "departAt": "2023-12-16T08:00:00+01:00",
                        "arriveAt": "2023-12-16T09:30:00+01:00",
                        "legs": ["known", "missing"],
                        "sections": ["s"]
                    }},
                    "legs": { "known": {
                        "departureLocation": "nowhere",
                        "arrivalLocation": "lyon",
                        "carrier": "ghost",
                        "transportMode": "bus"
                    }},
                    "sections": { "s": { "alternatives": ["a", "gone"] } },
                    "alternatives": { "a": {
                        "fullPrice": { "amount": 19.99, "currencyCode": "EUR" },
                        "fares": ["f-missing", "f-unknown-type"]
                    }},
                    "fares": { "f-unknown-type": { "fareType": "ft" } }
                },
                "locations": { "lyon": { "name": "Lyon Part-Dieu" } },
                "transportModes": { "bus": { "name": "Bus" } },
                "fareTypes": { "ft": { "name": "FLEX", "code": "not-in-table" } }
            }
        }))
        .unwrap();

        let result = &results[0];
        assert_eq!(result.departure_station, None);
        // Last leg is missing entirely.
        assert_eq!(result.arrival_station, None);
        assert_eq!(result.service_agencies, vec![None, None]);
        assert_eq!(result.products, vec![Some("Bus".to_string()), None]);
        assert_eq!(result.changeovers, 1);
        assert_eq!(result.duration_in_minutes, 90);
        assert_eq!(
            result.fares,
            vec![
                FareOption {
                    name: None,
                    price_in_cents: Some(1999),
                    currency: Some("EUR".into()),
                    comfort_class: None,
                },
                FareOption {
                    name: Some("FLEX".into()),
                    price_in_cents: Some(1999),
                    currency: Some("EUR".into()),
                    comfort_class: None,
                },
            ]
        );
    }

    #[test]
    fn journey_without_sections_has_no_fares() {
        let results = normalize_value(json!({
            "data": { "journeySearch": {
                "journeys": { "j": {
                    "departAt": "2023-12-16T08:00:00+01:00",
                    "arriveAt": "2023-12-16T09:00:00+01:00",
                    "legs": ["l"]
                }},
                "legs": { "l": {} }
            }}
        }))
        .unwrap();

        assert!(results[0].fares.is_empty());
        assert_eq!(results[0].changeovers, 0);
    }

    #[test]
    fn duration_truncates_toward_zero() {
        let results = normalize_value(json!({
            "data": { "journeySearch": { "journeys": {
                "partial": {
                    "departAt": "2023-12-16T08:00:00+01:00",
                    "arriveAt": "2023-12-16T08:01:59+01:00"
                },
                "across-offsets": {
                    "departAt": "2023-12-16T08:00:00+01:00",
                    "arriveAt": "2023-12-16T08:30:00+00:00"
                },
                "backwards": {
                    "departAt": "2023-12-16T08:00:00+01:00",
                    "arriveAt": "2023-12-16T07:59:30+01:00"
                }
            }}}
        }))
        .unwrap();

        let durations: Vec<i64> = results.iter().map(|r| r.duration_in_minutes).collect();
        assert_eq!(durations, vec![1, 90, 0]);
    }

    #[test]
    fn normalization_leaves_graph_untouched() {
        let graph = fixture();
        let first = normalize(&graph);
        let second = normalize(&graph);
        assert_eq!(first, second);
        assert_eq!(graph.journey_count(), 4);
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let results = normalize(&fixture());
        let value = serde_json::to_value(&results[0]).unwrap();

        assert_eq!(value["departure_station"], "Lille-Europe");
        assert_eq!(value["departure_at"], "2023-12-16T05:58:00+01:00");
        assert_eq!(value["fares"][0]["price_in_cents"], 9700);
    }
}
