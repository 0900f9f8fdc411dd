//! Parse a spec and list its sections

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use layoutspec_runner::{load_spec, Section};

use crate::output::{print_list, print_success, OutputFormat, TableDisplay};

#[derive(Args, Debug)]
pub struct CheckSpecArgs {
    /// Layout spec document
    pub path: PathBuf,
}

#[derive(Serialize)]
pub struct SectionDisplay {
    pub name: String,
    pub tags: Vec<String>,
    pub checks: usize,
}

impl From<&Section> for SectionDisplay {
    fn from(section: &Section) -> Self {
        Self {
            name: section.name.clone(),
            tags: section.tags.iter().cloned().collect(),
            checks: section.checks.len(),
        }
    }
}

impl TableDisplay for SectionDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Section", "Tags", "Checks"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.tags.join(", "),
            self.checks.to_string(),
        ]
    }
}

pub fn execute(args: CheckSpecArgs, format: OutputFormat) -> Result<bool> {
    let spec = load_spec(&args.path)?;
    let sections: Vec<SectionDisplay> = spec.sections.iter().map(SectionDisplay::from).collect();
    print_list(&sections, format);
    if matches!(format, OutputFormat::Table | OutputFormat::Plain) {
        print_success(&format!(
            "{} parsed: {} section(s), {} object(s)",
            args.path.display(),
            spec.sections.len(),
            spec.objects.len()
        ));
    }
    Ok(true)
}
