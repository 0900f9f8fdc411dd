//! CLI Commands

pub mod check_spec;
pub mod run;
pub mod suite;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use layoutspec_runner::playwright::{Browser, PlaywrightConfig, PlaywrightOpener};
use layoutspec_runner::static_html::StaticHtmlOpener;
use layoutspec_runner::{write_reports, PageOpener, SuiteReport};

use crate::output::{print_reports, OutputFormat};

/// Page rendering backend
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum Backend {
    /// Fetch over HTTP and read inline styles
    #[default]
    Static,
    /// Render in a real browser through Playwright
    Playwright,
}

/// Backend selection shared by the commands that run suites
#[derive(Args, Debug)]
pub struct BackendArgs {
    /// Page rendering backend
    #[arg(long, value_enum, default_value = "static")]
    pub backend: Backend,

    /// Browser for the playwright backend (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    pub browser: Browser,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Navigation timeout in seconds
    #[arg(long, default_value = "30")]
    pub navigation_timeout: u64,
}

impl BackendArgs {
    pub async fn opener(&self) -> Result<Arc<dyn PageOpener>> {
        let opener: Arc<dyn PageOpener> = match self.backend {
            Backend::Static => Arc::new(StaticHtmlOpener::new()?),
            Backend::Playwright => Arc::new(
                PlaywrightOpener::new(PlaywrightConfig {
                    browser: self.browser,
                    headless: !self.headed,
                    navigation_timeout: Duration::from_secs(self.navigation_timeout),
                    ..Default::default()
                })
                .await?,
            ),
        };
        Ok(opener)
    }
}

/// Print reports, optionally write them as JSON, and tell whether all passed
pub fn finish(
    reports: &[SuiteReport],
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<bool> {
    print_reports(reports, format);

    if let Some(dir) = output {
        write_reports(reports, dir)
            .with_context(|| format!("writing results to {}", dir.display()))?;
    }

    Ok(reports.iter().all(SuiteReport::was_successful))
}
