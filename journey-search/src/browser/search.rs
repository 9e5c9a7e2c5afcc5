//! Journey search by place name, through the site's own search form.

use chrono::{DateTime, FixedOffset};

use crate::error::SearchError;
use crate::graph::RawSearchGraph;

use super::chromium::ChromiumLauncher;
use super::driver::DriverLauncher;
use super::options::BrowserOptions;
use super::session::{BrowserSession, SearchPlan};

/// Searches by typing place names into the site and capturing the search
/// API response the page triggers.
#[derive(Debug, Clone)]
pub struct BrowserSearch<L = ChromiumLauncher> {
    launcher: L,
    options: BrowserOptions,
}

impl BrowserSearch<ChromiumLauncher> {
    /// Search with a locally launched Chromium.
    pub fn chromium(options: BrowserOptions) -> Self {
        Self::new(ChromiumLauncher::new(&options), options)
    }
}

impl<L: DriverLauncher> BrowserSearch<L> {
    pub fn new(launcher: L, options: BrowserOptions) -> Self {
        Self { launcher, options }
    }

    /// Search for journeys between two place names.
    ///
    /// Arguments are validated before a browser is started. Returns `None`
    /// if the page never called the search API.
    pub async fn fetch(
        &self,
        origin: &str,
        destination: &str,
        departure_at: DateTime<FixedOffset>,
    ) -> Result<Option<RawSearchGraph>, SearchError> {
        let origin = place_name(origin)?;
        let destination = place_name(destination)?;

        let driver = self.launcher.launch().await?;
        let plan = SearchPlan {
            origin,
            destination,
            departure_at,
        };
        let body = BrowserSession::new(driver, &self.options)
            .run(&plan)
            .await?;

        body.as_deref()
            .map(RawSearchGraph::from_json_str)
            .transpose()
    }
}

fn place_name(name: &str) -> Result<&str, SearchError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SearchError::invalid("from and to must be non-empty place names"));
    }
    Ok(name)
}
