//! Suite declarations and the validated runner configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::error::{RunnerError, RunnerResult};

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A suite declaration as written by the user.
///
/// Every field is optional here; [`RunnerConfig::read`] decides what is
/// required. Declarations come from builder calls in test code or from
/// `[[suite]]` tables in a TOML suite file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    /// Name used for the report; defaults to the spec file stem
    pub name: Option<String>,

    /// Path to the layout spec document
    pub spec: Option<String>,

    /// Address of the page to render
    pub url: Option<String>,

    /// Viewport to render the page at
    pub size: Option<Viewport>,

    /// Only sections carrying one of these tags run
    #[serde(default)]
    pub include: Vec<String>,

    /// Sections carrying one of these tags never run
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Declaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn spec(mut self, path: impl Into<String>) -> Self {
        self.spec = Some(path.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = Some(Viewport::new(width, height));
        self
    }

    pub fn include(mut self, tag: impl Into<String>) -> Self {
        self.include.push(tag.into());
        self
    }

    pub fn exclude(mut self, tag: impl Into<String>) -> Self {
        self.exclude.push(tag.into());
        self
    }

    /// Name to report under, even when the declaration is invalid
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        self.spec
            .as_deref()
            .and_then(|s| Path::new(s).file_stem())
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "suite".to_string())
    }
}

/// A required declaration is absent or unusable.
///
/// The messages are fixed; tooling matches on them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("The annotation @Size is missing.")]
    MissingSize,

    #[error("The annotation @Spec is missing.")]
    MissingSpec,

    #[error("The annotation @Url is missing.")]
    MissingUrl,

    #[error("The annotation @Size must have a positive width and height.")]
    InvalidSize { width: u32, height: u32 },
}

/// Validated, immutable configuration of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    name: String,
    spec_path: PathBuf,
    url: String,
    viewport: Viewport,
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl RunnerConfig {
    /// Validate a declaration.
    ///
    /// Checked in a fixed order, Size, then Spec, then Url; only the first
    /// problem is reported.
    pub fn read(declaration: &Declaration) -> Result<Self, ConfigError> {
        let viewport = declaration.size.ok_or(ConfigError::MissingSize)?;
        if viewport.width == 0 || viewport.height == 0 {
            return Err(ConfigError::InvalidSize {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let spec = non_blank(declaration.spec.as_deref()).ok_or(ConfigError::MissingSpec)?;
        let url = non_blank(declaration.url.as_deref()).ok_or(ConfigError::MissingUrl)?;

        Ok(Self {
            name: declaration.display_name(),
            spec_path: PathBuf::from(spec),
            url: url.to_string(),
            viewport,
            include: declaration.include.iter().cloned().collect(),
            exclude: declaration.exclude.iter().cloned().collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec_path(&self) -> &Path {
        &self.spec_path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn include(&self) -> &BTreeSet<String> {
        &self.include
    }

    pub fn exclude(&self) -> &BTreeSet<String> {
        &self.exclude
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A TOML file holding one or more `[[suite]]` declarations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteFile {
    #[serde(default, rename = "suite")]
    pub suites: Vec<Declaration>,
}

impl SuiteFile {
    /// Parse suite declarations from a TOML string
    pub fn from_toml(content: &str) -> RunnerResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a suite file, resolving relative spec paths against its directory
    pub fn load(path: &Path) -> RunnerResult<Vec<Declaration>> {
        let content = std::fs::read_to_string(path).map_err(|e| RunnerError::SuiteFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let file = Self::from_toml(&content).map_err(|e| RunnerError::SuiteFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let suites = file
            .suites
            .into_iter()
            .map(|mut decl| {
                if let Some(spec) = decl.spec.as_deref() {
                    if !spec.trim().is_empty() && Path::new(spec).is_relative() {
                        decl.spec = Some(base.join(spec).to_string_lossy().to_string());
                    }
                }
                decl
            })
            .collect::<Vec<_>>();

        debug!("Loaded {} suite(s) from {}", suites.len(), path.display());
        Ok(suites)
    }

    /// Load every `*.toml` suite file below a directory, in path order
    pub fn discover(dir: &Path) -> RunnerResult<Vec<Declaration>> {
        let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "toml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        let mut suites = Vec::new();
        for path in paths {
            suites.extend(Self::load(&path)?);
        }
        Ok(suites)
    }
}
