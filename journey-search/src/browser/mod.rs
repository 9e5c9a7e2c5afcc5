//! Browser-driven journey search.
//!
//! Some searches can only be expressed by place name, which the search API
//! does not accept directly. Here a headless browser fills in the site's
//! own search form and the search API response that the page triggers is
//! intercepted on its way to the page.

mod capture;
mod chromium;
mod driver;
#[cfg(test)]
mod mock;
mod options;
mod search;
mod session;

pub use capture::{Intercepted, ResponseCapture};
pub use chromium::{ChromiumDriver, ChromiumLauncher};
pub use driver::{BrowserDriver, DriverLauncher};
pub use options::{BrowserOptions, SiteSelectors};
pub use search::BrowserSearch;
pub use session::{BrowserSession, SearchPlan};
