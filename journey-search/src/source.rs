//! Choosing a search strategy and running the full pipeline.

use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use tracing::{info, warn};

use crate::browser::BrowserSearch;
use crate::client::SearchClient;
use crate::error::SearchError;
use crate::graph::RawSearchGraph;
use crate::normalize::{JourneyResult, normalize};

/// Accepted formats for a departure without an offset (read as UTC).
const NAIVE_DEPARTURE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// How to obtain the raw search response.
#[derive(Debug, Clone)]
pub enum JourneySource {
    /// POST to the search API with numeric location codes.
    ByCode(SearchClient),
    /// Drive the site's search form with place names.
    ByName(BrowserSearch),
}

impl JourneySource {
    /// Fetch the raw search graph.
    ///
    /// `None` means the browser search never saw a search response.
    pub async fn fetch(
        &self,
        origin: &str,
        destination: &str,
        departure_at: DateTime<FixedOffset>,
    ) -> Result<Option<RawSearchGraph>, SearchError> {
        match self {
            JourneySource::ByCode(client) => client
                .fetch(origin, destination, departure_at)
                .await
                .map(Some),
            JourneySource::ByName(search) => {
                search.fetch(origin, destination, departure_at).await
            }
        }
    }
}

/// Search with `source` and normalize the response.
///
/// Returns `None` when no search response was captured.
pub async fn find(
    source: &JourneySource,
    origin: &str,
    destination: &str,
    departure_at: DateTime<FixedOffset>,
) -> Result<Option<Vec<JourneyResult>>, SearchError> {
    let Some(graph) = source.fetch(origin, destination, departure_at).await? else {
        warn!(origin, destination, "no search response captured");
        return Ok(None);
    };

    let results = normalize(&graph);
    info!(journeys = results.len(), "found journeys");
    Ok(Some(results))
}

/// Normalize a saved search response, without any network access.
pub fn find_example(path: impl AsRef<Path>) -> Result<Vec<JourneyResult>, SearchError> {
    let graph = RawSearchGraph::from_path(path)?;
    Ok(normalize(&graph))
}

/// Parse a departure instant.
///
/// Accepts RFC 3339 (`2023-12-03T15:30:00+01:00`) or a local date-time
/// without offset (`2023-12-03T15:30`), which is taken as UTC.
pub fn parse_departure(input: &str) -> Result<DateTime<FixedOffset>, SearchError> {
    let input = input.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant);
    }

    NAIVE_DEPARTURE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| {
            SearchError::invalid(format!(
                "departure_at must be a date-time like 2023-12-03T15:30, got {input:?}"
            ))
        })
}
