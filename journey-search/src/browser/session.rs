//! The browser search choreography.
//!
//! A session walks strictly forward through: navigated → cookies accepted →
//! form filled → intercepting → submitted → results rendered → closed. Any
//! failure or expired wait jumps straight to closed. The browser is released
//! exactly once, whichever way the run ends.

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info, warn};

use crate::client::SEARCH_PATH;
use crate::error::SearchError;

use super::capture::{Intercepted, ResponseCapture};
use super::driver::BrowserDriver;
use super::options::BrowserOptions;

/// What to search for.
#[derive(Debug, Clone)]
pub struct SearchPlan<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
    pub departure_at: DateTime<FixedOffset>,
}

/// One browser, used for one search, then closed.
pub struct BrowserSession<'o, D: BrowserDriver> {
    driver: D,
    options: &'o BrowserOptions,
    capture: ResponseCapture,
}

impl<'o, D: BrowserDriver> BrowserSession<'o, D> {
    pub fn new(driver: D, options: &'o BrowserOptions) -> Self {
        Self {
            driver,
            options,
            capture: ResponseCapture::new(),
        }
    }

    /// Run the search and close the browser.
    ///
    /// Returns the raw body of the intercepted search response, or `None`
    /// if the page never called the search API. A 403 on that call fails
    /// with `SecurityBlocked`; a response whose body could not be read
    /// fails with `Browser`.
    pub async fn run(mut self, plan: &SearchPlan<'_>) -> Result<Option<String>, SearchError> {
        let outcome = self.search(plan).await;
        let released = self.driver.quit().await;

        match (outcome, released) {
            (Ok(body), Ok(())) => Ok(body),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(quit_err)) => {
                warn!(error = %quit_err, "failed to close browser after a failed search");
                Err(err)
            }
        }
    }

    async fn search(&mut self, plan: &SearchPlan<'_>) -> Result<Option<String>, SearchError> {
        let options = self.options;
        let selectors = &options.selectors;

        let url = options.search_page_url(plan.departure_at);
        info!(%url, origin = plan.origin, destination = plan.destination, "searching journeys by name");
        self.driver.goto(&url).await?;

        self.wait_for(
            &selectors.cookie_accept,
            options.consent_timeout,
            "cookie consent button",
        )
        .await?;
        self.driver.click(&selectors.cookie_accept).await?;
        debug!("accepted cookies");

        self.fill_station(&selectors.origin_input, plan.origin)
            .await?;
        self.fill_station(&selectors.destination_input, plan.destination)
            .await?;

        self.driver
            .intercept(SEARCH_PATH, self.capture.clone())
            .await?;
        self.driver.click(&selectors.submit).await?;
        debug!("submitted search form");

        let capture = self.capture.clone();
        tokio::select! {
            rendered = self.wait_for(&selectors.results, options.results_timeout, "search results") => rendered?,
            url = capture.forbidden() => return Err(SearchError::SecurityBlocked { url }),
        }

        // The results container only renders once the search response has
        // reached the page, so the interceptor has run by now.
        match self.capture.get() {
            Some(Intercepted::Body(body)) => Ok(Some(body.clone())),
            Some(Intercepted::Forbidden { url }) => {
                Err(SearchError::SecurityBlocked { url: url.clone() })
            }
            Some(Intercepted::Failed(reason)) => Err(SearchError::Browser(format!(
                "failed to capture search response: {reason}"
            ))),
            None => {
                warn!("results rendered but no search response was intercepted");
                Ok(None)
            }
        }
    }

    /// Type a place name and pick the first suggestion.
    async fn fill_station(&mut self, input: &str, name: &str) -> Result<(), SearchError> {
        let options = self.options;
        self.driver.type_text(input, name).await?;
        self.wait_for(
            &options.selectors.suggestion,
            options.suggestion_timeout,
            "station suggestions",
        )
        .await?;
        self.driver.click(&options.selectors.suggestion).await?;
        debug!(input, name, "picked station suggestion");
        Ok(())
    }

    /// Poll until `selector` is present, giving up after `limit`.
    async fn wait_for(
        &mut self,
        selector: &str,
        limit: Duration,
        waiting_for: &str,
    ) -> Result<(), SearchError> {
        let poll_interval = self.options.poll_interval;
        let driver = &mut self.driver;

        let waited: Result<Result<(), SearchError>, _> = tokio::time::timeout(limit, async {
            loop {
                if driver.is_present(selector).await? {
                    return Ok(());
                }
                tokio::time::sleep(poll_interval).await;
            }
        })
        .await;

        waited.unwrap_or_else(|_| {
            Err(SearchError::Timeout {
                waiting_for: waiting_for.to_string(),
                secs: limit.as_secs(),
            })
        })
    }
}
