//! Static HTML backend
//!
//! Fetches the page over HTTP and derives element geometry from inline
//! styles without running a layout engine. Elements with an explicit
//! `width`/`height` in pixels report those values; block elements without one
//! fill the viewport width and report zero height. Only `#id` locators are
//! measured. Use the Playwright backend for real rendering.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Viewport;
use crate::error::{RunnerError, RunnerResult};
use crate::page::{ElementBox, PageOpener, PageRequest, RenderedPage};

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[a-zA-Z][a-zA-Z0-9-]*(\s[^>]*)?>").unwrap());
static ID_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bid\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static STYLE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bstyle\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

const BACKEND: &str = "static";

/// Page backend that reads geometry from inline styles
pub struct StaticHtmlOpener {
    client: reqwest::Client,
}

impl StaticHtmlOpener {
    pub fn new() -> RunnerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageOpener for StaticHtmlOpener {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn open(&self, request: &PageRequest) -> RunnerResult<RenderedPage> {
        let response = self.client.get(&request.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RunnerError::PageLoad {
                url: request.url.clone(),
                reason: format!("server answered {}", status),
            });
        }
        let html = response.text().await?;
        debug!("Fetched {} bytes from {}", html.len(), request.url);

        Ok(measure(&request.url, &html, request.viewport, &request.locators))
    }
}

/// Build a page snapshot for `locators` out of raw HTML
pub fn measure(url: &str, html: &str, viewport: Viewport, locators: &[String]) -> RenderedPage {
    let styles = inline_styles_by_id(html);
    let mut page = RenderedPage::new(url, viewport);

    for locator in locators {
        let Some(id) = locator.strip_prefix('#').filter(|id| is_plain_id(id)) else {
            // Left unmeasured; checks on it error out individually
            warn!("The {} backend only measures #id locators, skipping {}", BACKEND, locator);
            continue;
        };

        let element = styles
            .get(id)
            .map(|style| element_box(style.as_deref(), viewport));
        page.insert(locator.clone(), element);
    }

    page
}

/// Map of element id to its inline style attribute, first occurrence wins
fn inline_styles_by_id(html: &str) -> HashMap<String, Option<String>> {
    let mut styles = HashMap::new();
    for tag in TAG.find_iter(html) {
        let tag = tag.as_str();
        let Some(id) = ID_ATTR.captures(tag).and_then(|c| c.get(1).or_else(|| c.get(2))) else {
            continue;
        };
        let style = STYLE_ATTR
            .captures(tag)
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string());
        styles.entry(id.as_str().to_string()).or_insert(style);
    }
    styles
}

fn is_plain_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

fn element_box(style: Option<&str>, viewport: Viewport) -> ElementBox {
    let declarations: HashMap<String, String> = style
        .unwrap_or_default()
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_ascii_lowercase()))
        .collect();

    let pixels = |name: &str| {
        declarations
            .get(name)
            .and_then(|v| v.strip_suffix("px"))
            .and_then(|v| v.trim().parse::<f64>().ok())
    };

    let hidden = declarations.get("display").map(String::as_str) == Some("none")
        || declarations.get("visibility").map(String::as_str) == Some("hidden");

    ElementBox {
        left: pixels("left").unwrap_or(0.0),
        top: pixels("top").unwrap_or(0.0),
        width: pixels("width").unwrap_or(viewport.width as f64),
        height: pixels("height").unwrap_or(0.0),
        visible: !hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
</head>
<body>
<p id="p1" style="width:400px;float:left;">First paragraph.</p>
<p id="p2">Second paragraph.</p>
<div id='banner' style='display: none; height: 30px'></div>
</body>
</html>"#;

    fn locators(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_measure_inline_styles() {
        let page = measure(
            "http://localhost/",
            PAGE,
            Viewport::new(640, 480),
            &locators(&["#p1", "#p2", "#banner", "#nope"]),
        );

        let p1 = page.element("#p1").unwrap().unwrap();
        assert_eq!(p1.width, 400.0);
        assert!(p1.visible);

        let p2 = page.element("#p2").unwrap().unwrap();
        assert_eq!(p2.width, 640.0);
        assert_eq!(p2.height, 0.0);

        let banner = page.element("#banner").unwrap().unwrap();
        assert!(!banner.visible);
        assert_eq!(banner.height, 30.0);

        assert_eq!(page.element("#nope").unwrap(), None);
    }

    #[test]
    fn test_css_selectors_are_left_unmeasured() {
        let page = measure(
            "http://localhost/",
            PAGE,
            Viewport::new(640, 480),
            &locators(&["p.intro", "#p1"]),
        );
        assert!(matches!(page.element("p.intro"), Err(RunnerError::NotMeasured(_))));
        assert!(page.element("#p1").unwrap().is_some());
    }
}
