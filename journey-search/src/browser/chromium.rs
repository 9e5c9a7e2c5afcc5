//! Chrome DevTools Protocol driver built on `chromiumoxide`.
//!
//! The search response is captured with the CDP `Fetch` domain: requests to
//! the search API are paused at the response stage, their body is read and
//! recorded, and the request is then continued untouched so the page
//! renders its results as usual.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, GetResponseBodyParams,
    RequestPattern, RequestStage,
};
use chromiumoxide::error::CdpError;
use futures::StreamExt;
use reqwest::Url;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::SearchError;

use super::capture::{Intercepted, ResponseCapture};
use super::driver::{BrowserDriver, DriverLauncher};
use super::options::BrowserOptions;

/// Flags that keep the site from spotting an automated browser.
const STEALTH_ARGS: [&str; 2] = [
    "--start-maximized",
    "--disable-blink-features=AutomationControlled",
];

/// Launches a local Chromium for each search.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    headless: bool,
}

impl ChromiumLauncher {
    pub fn new(options: &BrowserOptions) -> Self {
        Self {
            headless: options.headless,
        }
    }
}

impl DriverLauncher for ChromiumLauncher {
    type Driver = ChromiumDriver;

    async fn launch(&self) -> Result<ChromiumDriver, SearchError> {
        let mut builder = BrowserConfig::builder();
        builder = if self.headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        for arg in STEALTH_ARGS {
            builder = builder.arg(arg);
        }
        let config = builder.build().map_err(SearchError::Browser)?;

        let (browser, mut events) = Browser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(err) = event {
                    debug!(error = %err, "browser handler event failed");
                }
            }
        });
        debug!(headless = self.headless, "launched chromium");

        Ok(ChromiumDriver {
            browser,
            handler,
            page: None,
            interceptor: None,
        })
    }
}

/// A running Chromium with (at most) one page.
pub struct ChromiumDriver {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Option<Page>,
    interceptor: Option<JoinHandle<()>>,
}

impl ChromiumDriver {
    fn page(&self) -> Result<&Page, SearchError> {
        self.page
            .as_ref()
            .ok_or_else(|| SearchError::Browser("no page open; navigate first".to_string()))
    }
}

impl BrowserDriver for ChromiumDriver {
    async fn goto(&mut self, url: &str) -> Result<(), SearchError> {
        if let Some(page) = &self.page {
            page.goto(url).await?;
        } else {
            let page = self.browser.new_page(url).await?;
            self.page = Some(page);
        }
        Ok(())
    }

    async fn is_present(&mut self, selector: &str) -> Result<bool, SearchError> {
        element_found(self.page()?.find_element(selector).await)
    }

    async fn click(&mut self, selector: &str) -> Result<(), SearchError> {
        self.page()?.find_element(selector).await?.click().await?;
        Ok(())
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), SearchError> {
        let input = self.page()?.find_element(selector).await?;
        input.click().await?;
        input.type_str(text).await?;
        Ok(())
    }

    async fn intercept(&mut self, path: &str, capture: ResponseCapture) -> Result<(), SearchError> {
        let page = self.page()?.clone();

        let mut paused = page.event_listener::<EventRequestPaused>().await?;
        let pattern = RequestPattern::builder()
            .url_pattern(format!("*{path}*"))
            .request_stage(RequestStage::Response)
            .build();
        page.execute(EnableParams::builder().pattern(pattern).build())
            .await?;

        let path = path.to_string();
        self.interceptor = Some(tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                if let Err(err) = forward_paused(&page, &event, &path, &capture).await {
                    warn!(error = %err, url = %event.request.url, "failed to handle intercepted response");
                }
            }
        }));
        Ok(())
    }

    async fn quit(mut self) -> Result<(), SearchError> {
        if let Some(interceptor) = self.interceptor.take() {
            interceptor.abort();
        }
        let closed = self.browser.close().await;
        if let Err(err) = self.browser.wait().await {
            debug!(error = %err, "failed to reap chromium process");
        }
        self.handler.abort();
        closed?;
        debug!("closed chromium");
        Ok(())
    }
}

/// Lookup failures reported by the page mean the element is not there;
/// anything else means the browser itself is gone.
fn element_found<T>(lookup: Result<T, CdpError>) -> Result<bool, SearchError> {
    match lookup {
        Ok(_) => Ok(true),
        Err(CdpError::NotFound | CdpError::Chrome(_)) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Record a paused search response, then let it through to the page.
///
/// A matched response that cannot be read is recorded as a failure.
async fn forward_paused(
    page: &Page,
    event: &EventRequestPaused,
    path: &str,
    capture: &ResponseCapture,
) -> Result<(), SearchError> {
    let recorded = match event.response_status_code {
        Some(status) if path_matches(&event.request.url, path) => {
            let recorded = record_response(page, event, status, capture).await;
            if let Err(err) = &recorded {
                capture.record(Intercepted::Failed(err.to_string()));
            }
            recorded
        }
        _ => Ok(()),
    };

    page.execute(ContinueRequestParams::new(event.request_id.clone()))
        .await?;
    recorded
}

async fn record_response(
    page: &Page,
    event: &EventRequestPaused,
    status: i64,
    capture: &ResponseCapture,
) -> Result<(), SearchError> {
    if status == 403 {
        warn!(url = %event.request.url, "search response blocked");
        capture.record(Intercepted::Forbidden {
            url: event.request.url.clone(),
        });
        return Ok(());
    }

    let response = page
        .execute(GetResponseBodyParams::new(event.request_id.clone()))
        .await?;
    let body = decode_body(&response.result.body, response.result.base64_encoded)?;
    debug!(status, bytes = body.len(), "captured search response");
    capture.record(Intercepted::Body(body));
    Ok(())
}

/// Whether `url`'s path is exactly `path`.
fn path_matches(url: &str, path: &str) -> bool {
    Url::parse(url).is_ok_and(|url| url.path() == path)
}

fn decode_body(body: &str, base64_encoded: bool) -> Result<String, SearchError> {
    if !base64_encoded {
        return Ok(body.to_string());
    }
    let bytes = BASE64
        .decode(body)
        .map_err(|e| SearchError::Browser(format!("invalid base64 response body: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| SearchError::Browser(format!("response body is not UTF-8: {e}")))
}
