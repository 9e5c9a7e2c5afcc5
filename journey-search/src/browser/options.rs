//! Configuration for browser-driven searches.

use std::time::Duration;

use chrono::{DateTime, FixedOffset};

use crate::client::{BASE_URL_ENV, DEFAULT_BASE_URL};

/// Page holding the journey search form, relative to the base URL.
const SEARCH_PAGE: &str = "/en-us";

/// CSS selectors for the parts of the site's search UI we drive.
///
/// This is the site's DOM contract; it changes whenever the site does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSelectors {
    pub cookie_accept: String,
    pub origin_input: String,
    pub destination_input: String,
    /// First entry of the station suggestion list.
    pub suggestion: String,
    pub submit: String,
    pub results: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            cookie_accept: "#onetrust-accept-btn-handler".to_string(),
            origin_input: "input[data-test=from-station-input]".to_string(),
            destination_input: "input[data-test=to-station-input]".to_string(),
            suggestion: "span[data-test=suggested-station-name]".to_string(),
            submit: "button[data-test=submit-journey-search-button]".to_string(),
            results: "div[data-test=outward-eu-results-container]".to_string(),
        }
    }
}

/// Options for [`BrowserSearch`](super::BrowserSearch).
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Base URL of the site (no trailing slash)
    pub base_url: String,
    /// Run without a visible window
    pub headless: bool,
    /// How long to wait for the cookie consent button
    pub consent_timeout: Duration,
    /// How long to wait for station suggestions after typing
    pub suggestion_timeout: Duration,
    /// How long to wait for the results container after submitting
    pub results_timeout: Duration,
    /// Delay between element presence checks while waiting
    pub poll_interval: Duration,
    pub selectors: SiteSelectors,
}

impl BrowserOptions {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headless: true,
            consent_timeout: Duration::from_secs(10),
            suggestion_timeout: Duration::from_secs(3),
            results_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
            selectors: SiteSelectors::default(),
        }
    }

    /// Read overrides from the environment (`TRAINLINE_BASE_URL`).
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.is_empty() => Self::new().with_base_url(url),
            _ => Self::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_results_timeout(mut self, timeout: Duration) -> Self {
        self.results_timeout = timeout;
        self
    }

    pub fn with_selectors(mut self, selectors: SiteSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// URL of the search form with the departure preselected.
    ///
    /// The date is written in the departure's own offset, to the minute.
    pub fn search_page_url(&self, departure_at: DateTime<FixedOffset>) -> String {
        format!(
            "{}{SEARCH_PAGE}?outwardDate={}",
            self.base_url,
            departure_at.format("%Y-%m-%dT%H:%M")
        )
    }
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self::new()
    }
}
