//! Error types for the layout spec runner

use thiserror::Error;

/// Faults raised while loading, rendering or checking a spec.
///
/// These are *execution* errors. A layout rule that simply does not hold is
/// not an error; it is reported as a mismatch (see [`crate::report::FailureCause`]).
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Spec parse error in {path}: {reason}")]
    SpecParse { path: String, reason: String },

    #[error("Object \"{0}\" is not defined in the spec objects")]
    UnknownObject(String),

    #[error("Locator {0} was not measured by the page backend")]
    NotMeasured(String),

    #[error("Failed to load page {url}: {reason}")]
    PageLoad { url: String, reason: String },

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Suite file error in {path}: {reason}")]
    SuiteFile { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type RunnerResult<T> = Result<T, RunnerError>;
