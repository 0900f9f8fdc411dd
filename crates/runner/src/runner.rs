//! Runner that turns one suite declaration into one report

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{Declaration, RunnerConfig};
use crate::executor::execute_section;
use crate::filter::TagFilter;
use crate::page::{PageOpener, PageProvider, PageRequest};
use crate::report::SuiteReport;
use crate::spec::load_spec;

/// Runs suite declarations against a page backend.
///
/// Each run reads its configuration, loads the spec, filters sections and
/// checks them one at a time in spec order. A bad declaration or spec ends
/// the run with a single failing `initialization` test.
pub struct SpecRunner {
    opener: Arc<dyn PageOpener>,
    spec_root: Option<PathBuf>,
}

impl SpecRunner {
    pub fn new(opener: impl PageOpener + 'static) -> Self {
        Self::with_opener(Arc::new(opener))
    }

    pub fn with_opener(opener: Arc<dyn PageOpener>) -> Self {
        Self {
            opener,
            spec_root: None,
        }
    }

    /// Directory that relative spec paths are resolved against
    pub fn with_spec_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.spec_root = Some(root.into());
        self
    }

    fn resolve(&self, spec: &Path) -> PathBuf {
        match &self.spec_root {
            Some(root) if spec.is_relative() => root.join(spec),
            _ => spec.to_path_buf(),
        }
    }

    /// Run one suite
    pub async fn run(&self, declaration: &Declaration) -> SuiteReport {
        let start = Instant::now();
        let suite = declaration.display_name();
        info!("Running suite '{}'", suite);

        let config = match RunnerConfig::read(declaration) {
            Ok(config) => config,
            Err(e) => {
                warn!("Suite '{}' is misconfigured: {}", suite, e);
                return finish(SuiteReport::configuration_failure(suite, e.to_string()), start);
            }
        };

        let spec_path = self.resolve(config.spec_path());
        let spec = match load_spec(&spec_path) {
            Ok(spec) => spec,
            Err(e) => {
                warn!("Suite '{}' has an unusable spec: {}", suite, e);
                return finish(SuiteReport::configuration_failure(suite, e.to_string()), start);
            }
        };

        let filter = TagFilter::new(config.include().clone(), config.exclude().clone());
        let sections = filter.apply(&spec.sections);
        info!(
            "{} of {} section(s) selected from {}",
            sections.len(),
            spec.sections.len(),
            spec_path.display()
        );

        let request = PageRequest {
            url: config.url().to_string(),
            viewport: config.viewport(),
            locators: spec.locators(&sections),
        };
        debug!("Page request: {:?}", request);

        let mut report = SuiteReport::new(config.name());
        let mut pages = PageProvider::new(self.opener.as_ref(), request);
        for (i, section) in sections.into_iter().enumerate() {
            let started = Instant::now();
            let outcome = execute_section(i + 1, section, &spec.objects, &mut pages).await;
            report.push(section.name.clone(), outcome, started.elapsed());
        }
        drop(pages);

        finish(report, start)
    }

    /// Run suites one after another; each run gets its own page
    pub async fn run_all(&self, declarations: &[Declaration]) -> Vec<SuiteReport> {
        let mut reports = Vec::with_capacity(declarations.len());
        for declaration in declarations {
            reports.push(self.run(declaration).await);
        }
        reports
    }
}

fn finish(mut report: SuiteReport, start: Instant) -> SuiteReport {
    report.duration_ms = start.elapsed().as_millis() as u64;
    report.log_summary();
    report
}
