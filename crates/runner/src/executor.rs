//! Executes one section against the run's page

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::RunnerError;
use crate::page::PageProvider;
use crate::rule::CheckResult;
use crate::spec::Section;

/// Outcome of one section
#[derive(Debug, Clone)]
pub enum Outcome {
    Passed,
    /// A layout rule did not hold
    Failed(String),
    /// The section could not be evaluated
    Errored(Arc<RunnerError>),
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

/// Log label for a section; `position` is 1-based so duplicate names stay apart
fn label(position: usize, section: &Section) -> String {
    format!("#{} '{}'", position, section.name)
}

/// Run the checks of `section` in order, stopping at the first failure.
///
/// `position` is the section's 1-based place among the selected sections.
/// A section without checks passes without touching the page.
pub async fn execute_section(
    position: usize,
    section: &Section,
    objects: &BTreeMap<String, String>,
    pages: &mut PageProvider<'_>,
) -> Outcome {
    let section_label = label(position, section);
    if section.checks.is_empty() {
        debug!("Section {} has no checks", section_label);
        return Outcome::Passed;
    }

    let page = match pages.page().await {
        Ok(page) => page,
        Err(e) => return Outcome::Errored(e),
    };

    for (i, check) in section.checks.iter().enumerate() {
        match check.evaluate(objects, page) {
            Ok(CheckResult::Passed) => {}
            Ok(CheckResult::Failed(message)) => {
                debug!("Section {} failed at check {}", section_label, i + 1);
                return Outcome::Failed(message);
            }
            Err(e) => {
                warn!("Section {} check {} errored: {}", section_label, i + 1, e);
                return Outcome::Errored(Arc::new(e));
            }
        }
    }

    Outcome::Passed
}
