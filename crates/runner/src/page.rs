//! Rendered pages and the backends that open them

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::Viewport;
use crate::error::{RunnerError, RunnerResult};

/// Geometry of one element, in CSS pixels relative to the page origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
}

impl ElementBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            visible: true,
        }
    }
}

/// A page rendered at a fixed viewport, reduced to the geometry of the
/// locators that were requested when it was opened.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    url: String,
    viewport: Viewport,
    /// `None` marks a locator that matched nothing
    elements: HashMap<String, Option<ElementBox>>,
}

impl RenderedPage {
    pub fn new(url: impl Into<String>, viewport: Viewport) -> Self {
        Self {
            url: url.into(),
            viewport,
            elements: HashMap::new(),
        }
    }

    pub fn insert(&mut self, locator: impl Into<String>, element: Option<ElementBox>) {
        self.elements.insert(locator.into(), element);
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Look up a measured locator.
    ///
    /// `Ok(None)` means the element does not exist on the page; `Err` means the
    /// backend was never asked to measure this locator.
    pub fn element(&self, locator: &str) -> RunnerResult<Option<&ElementBox>> {
        self.elements
            .get(locator)
            .map(Option::as_ref)
            .ok_or_else(|| RunnerError::NotMeasured(locator.to_string()))
    }
}

/// What to render and what to measure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    pub viewport: Viewport,
    pub locators: Vec<String>,
}

/// Rendering backend: loads a URL at a viewport and measures locators
#[async_trait]
pub trait PageOpener: Send + Sync {
    /// Short backend name for logs and errors
    fn name(&self) -> &str;

    async fn open(&self, request: &PageRequest) -> RunnerResult<RenderedPage>;
}

/// Opens the page of one run at most once and hands it to every section.
///
/// A failed open is cached too, so every section that needs the page sees the
/// same error. The page is released when the provider is dropped.
pub struct PageProvider<'a> {
    opener: &'a dyn PageOpener,
    request: PageRequest,
    page: Option<Result<RenderedPage, Arc<RunnerError>>>,
}

impl<'a> PageProvider<'a> {
    pub fn new(opener: &'a dyn PageOpener, request: PageRequest) -> Self {
        Self {
            opener,
            request,
            page: None,
        }
    }

    pub async fn page(&mut self) -> Result<&RenderedPage, Arc<RunnerError>> {
        let slot = match self.page.take() {
            Some(slot) => slot,
            None => {
                info!(
                    "Opening {} at {} with the {} backend",
                    self.request.url,
                    self.request.viewport,
                    self.opener.name()
                );
                let opened = self.opener.open(&self.request).await.map_err(Arc::new);
                if let Err(e) = &opened {
                    error!("Could not open {}: {}", self.request.url, e);
                }
                opened
            }
        };

        match self.page.insert(slot) {
            Ok(page) => Ok(&*page),
            Err(e) => Err(Arc::clone(e)),
        }
    }

    /// Whether an open was attempted
    pub fn is_opened(&self) -> bool {
        self.page.is_some()
    }
}

impl Drop for PageProvider<'_> {
    fn drop(&mut self) {
        if let Some(Ok(page)) = self.page.take() {
            debug!("Releasing page {}", page.url());
        }
    }
}
