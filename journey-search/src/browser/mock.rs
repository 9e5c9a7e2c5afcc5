//! Scripted browser for exercising sessions without Chromium.
//!
//! Every driver call is logged. Clicking the submit button plays the
//! scripted search response into the installed capture, the way the real
//! interceptor would once the page calls the search API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::client::SEARCH_PATH;
use crate::error::SearchError;

use super::capture::{Intercepted, ResponseCapture};
use super::driver::{BrowserDriver, DriverLauncher};
use super::options::SiteSelectors;

/// A driver call, as seen by the scripted browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Goto(String),
    Click(String),
    Type(String, String),
    Intercept(String),
    Quit,
}

/// What the site does when the search form is submitted.
#[derive(Debug, Clone)]
pub enum OnSubmit {
    /// The page never calls the search API.
    Nothing,
    /// The search API answers with this body.
    Respond(String),
    /// The search API answers 403.
    Forbid,
    /// The search API answers but its body cannot be read.
    CaptureFailed(String),
}

/// Launcher handing out scripted drivers that share one call log.
#[derive(Clone)]
pub struct Script {
    on_submit: OnSubmit,
    submit: String,
    absent: Vec<String>,
    failing_clicks: Vec<String>,
    log: Arc<Mutex<Vec<Step>>>,
    launches: Arc<AtomicUsize>,
}

impl Script {
    pub fn new(on_submit: OnSubmit) -> Self {
        Self {
            on_submit,
            submit: SiteSelectors::default().submit,
            absent: Vec::new(),
            failing_clicks: Vec::new(),
            log: Arc::new(Mutex::new(Vec::new())),
            launches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Play the search response when `selector` is clicked.
    pub fn submitting_with(mut self, selector: &str) -> Self {
        self.submit = selector.to_string();
        self
    }

    /// Never show elements matching `selector`.
    pub fn without(mut self, selector: &str) -> Self {
        self.absent.push(selector.to_string());
        self
    }

    /// Fail clicks on `selector`.
    pub fn failing_click(mut self, selector: &str) -> Self {
        self.failing_clicks.push(selector.to_string());
        self
    }

    pub fn steps(&self) -> Vec<Step> {
        self.log.lock().unwrap().clone()
    }

    pub fn quit_count(&self) -> usize {
        self.steps().iter().filter(|s| **s == Step::Quit).count()
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl DriverLauncher for Script {
    type Driver = ScriptedDriver;

    async fn launch(&self) -> Result<ScriptedDriver, SearchError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedDriver {
            script: self.clone(),
            capture: None,
        })
    }
}

pub struct ScriptedDriver {
    script: Script,
    capture: Option<ResponseCapture>,
}

impl ScriptedDriver {
    fn log(&self, step: Step) {
        self.script.log.lock().unwrap().push(step);
    }
}

impl BrowserDriver for ScriptedDriver {
    async fn goto(&mut self, url: &str) -> Result<(), SearchError> {
        self.log(Step::Goto(url.to_string()));
        Ok(())
    }

    async fn is_present(&mut self, selector: &str) -> Result<bool, SearchError> {
        Ok(!self.script.absent.iter().any(|s| s == selector))
    }

    async fn click(&mut self, selector: &str) -> Result<(), SearchError> {
        if self.script.failing_clicks.iter().any(|s| s == selector) {
            return Err(SearchError::Browser(format!("element {selector} is detached")));
        }
        self.log(Step::Click(selector.to_string()));

        if selector == self.script.submit
            && let Some(capture) = &self.capture
        {
            match &self.script.on_submit {
                OnSubmit::Nothing => {}
                OnSubmit::Respond(body) => {
                    capture.record(Intercepted::Body(body.clone()));
                }
                OnSubmit::Forbid => {
                    capture.record(Intercepted::Forbidden {
                        url: format!("http://example.com{SEARCH_PATH}"),
                    });
                }
                OnSubmit::CaptureFailed(reason) => {
                    capture.record(Intercepted::Failed(reason.clone()));
                }
            }
        }
        Ok(())
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), SearchError> {
        self.log(Step::Type(selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn intercept(&mut self, path: &str, capture: ResponseCapture) -> Result<(), SearchError> {
        self.log(Step::Intercept(path.to_string()));
        self.capture = Some(capture);
        Ok(())
    }

    async fn quit(self) -> Result<(), SearchError> {
        self.log(Step::Quit);
        Ok(())
    }
}
