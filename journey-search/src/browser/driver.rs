//! The seam between the search choreography and a real browser.

use std::future::Future;

use crate::error::SearchError;

use super::capture::ResponseCapture;

/// Operations the search choreography needs from a headless browser.
///
/// Selectors are CSS selectors. Implementations report failures as
/// [`SearchError`]; they never retry.
pub trait BrowserDriver: Send {
    /// Load `url` in the browser's page.
    fn goto(&mut self, url: &str) -> impl Future<Output = Result<(), SearchError>> + Send;

    /// Whether an element matching `selector` is currently on the page.
    fn is_present(
        &mut self,
        selector: &str,
    ) -> impl Future<Output = Result<bool, SearchError>> + Send;

    /// Click the first element matching `selector`.
    fn click(&mut self, selector: &str) -> impl Future<Output = Result<(), SearchError>> + Send;

    /// Type `text` into the first element matching `selector`.
    fn type_text(
        &mut self,
        selector: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), SearchError>> + Send;

    /// Start watching responses to requests whose path is `path`.
    ///
    /// Matching responses still reach the page unmodified; what was seen is
    /// recorded into `capture`.
    fn intercept(
        &mut self,
        path: &str,
        capture: ResponseCapture,
    ) -> impl Future<Output = Result<(), SearchError>> + Send;

    /// Shut the browser down, releasing the underlying process.
    fn quit(self) -> impl Future<Output = Result<(), SearchError>> + Send;
}

/// Starts one [`BrowserDriver`] per search.
pub trait DriverLauncher: Sync {
    type Driver: BrowserDriver;

    fn launch(&self) -> impl Future<Output = Result<Self::Driver, SearchError>> + Send;
}
