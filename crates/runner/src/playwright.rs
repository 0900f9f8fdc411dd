//! Playwright browser backend
//!
//! Generates a Node script that opens the page at the requested viewport,
//! measures every locator with `getBoundingClientRect` and prints the result
//! as one JSON line. The browser is closed in the script's `finally` block, so
//! nothing outlives a single `open`.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::error::{RunnerError, RunnerResult};
use crate::page::{ElementBox, PageOpener, PageRequest, RenderedPage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(format!("unknown browser: {}", other)),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    /// Navigation timeout handed to `page.goto`
    pub navigation_timeout: Duration,
    /// Node executable
    pub node_binary: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            navigation_timeout: Duration::from_secs(30),
            node_binary: PathBuf::from("node"),
        }
    }
}

/// Page backend driving a real browser through Playwright
pub struct PlaywrightOpener {
    config: PlaywrightConfig,
}

/// Shape of the JSON line printed by the generated script
#[derive(Debug, Deserialize)]
struct Measurement {
    elements: HashMap<String, Option<ElementBox>>,
}

impl PlaywrightOpener {
    /// Create a backend, verifying that Node can load Playwright
    pub async fn new(config: PlaywrightConfig) -> RunnerResult<Self> {
        let opener = Self { config };
        opener.check_playwright_installed().await?;
        Ok(opener)
    }

    async fn check_playwright_installed(&self) -> RunnerResult<()> {
        let status = Command::new(&self.config.node_binary)
            .args(["-e", "require('playwright')"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(RunnerError::PlaywrightNotFound),
        }
    }

    /// Build the measuring script for a request
    pub fn build_script(&self, request: &PageRequest) -> RunnerResult<String> {
        let url = serde_json::to_string(&request.url)?;
        let locators = serde_json::to_string(&request.locators)?;

        Ok(format!(
            r#"
const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  try {{
    const context = await browser.newContext({{
      viewport: {{ width: {width}, height: {height} }}
    }});
    const page = await context.newPage();
    await page.goto({url}, {{ waitUntil: 'load', timeout: {timeout} }});

    const elements = await page.evaluate((locators) => {{
      const result = {{}};
      for (const locator of locators) {{
        const el = document.querySelector(locator);
        if (!el) {{
          result[locator] = null;
          continue;
        }}
        const rect = el.getBoundingClientRect();
        const style = window.getComputedStyle(el);
        result[locator] = {{
          left: Math.round(rect.left + window.scrollX),
          top: Math.round(rect.top + window.scrollY),
          width: Math.round(rect.width),
          height: Math.round(rect.height),
          visible: style.display !== 'none' && style.visibility !== 'hidden'
            && rect.width > 0 && rect.height > 0,
        }};
      }}
      return result;
    }}, {locators});

    console.log(JSON.stringify({{ elements }}));
  }} catch (error) {{
    console.error(error.message);
    process.exitCode = 1;
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            width = request.viewport.width,
            height = request.viewport.height,
            url = url,
            timeout = self.config.navigation_timeout.as_millis(),
            locators = locators,
        ))
    }

    async fn run_script(&self, script: &str) -> RunnerResult<String> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("measure.js");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());

        let output = Command::new(&self.config.node_binary)
            .arg(&script_path)
            .current_dir(temp_dir.path())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RunnerError::Playwright(format!(
                "script failed: {}",
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl PageOpener for PlaywrightOpener {
    fn name(&self) -> &str {
        self.config.browser.as_str()
    }

    async fn open(&self, request: &PageRequest) -> RunnerResult<RenderedPage> {
        let script = self.build_script(request)?;
        let stdout = self.run_script(&script).await.map_err(|e| match e {
            RunnerError::Playwright(reason) => RunnerError::PageLoad {
                url: request.url.clone(),
                reason,
            },
            other => other,
        })?;
        parse_measurement(request, &stdout)
    }
}

/// Turn the script's stdout into a page; the last non-empty line is the JSON
fn parse_measurement(request: &PageRequest, stdout: &str) -> RunnerResult<RenderedPage> {
    let line = stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| RunnerError::Playwright("script printed no measurement".to_string()))?;
    let measurement: Measurement = serde_json::from_str(line)?;

    let mut page = RenderedPage::new(&request.url, request.viewport);
    for (locator, element) in measurement.elements {
        page.insert(locator, element);
    }
    Ok(page)
}
