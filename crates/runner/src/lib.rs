//! Layout spec runner
//!
//! Checks the layout of a web page against a declarative YAML spec:
//! - Validates a suite declaration (spec, url, viewport size, tags)
//! - Parses the spec into ordered, tagged sections of checks
//! - Selects sections with include/exclude tags
//! - Renders the page once per run and checks each section against it
//! - Reports one pass/fail result per section
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SpecRunner::run(Declaration)             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RunnerConfig::read   -> ConfigError => 1 failing test      │
//! │  load_spec            -> SpecParse   => 1 failing test      │
//! │  TagFilter::apply     -> selected sections, spec order      │
//! │  PageProvider         -> PageOpener::open, once per run     │
//! │  execute_section      -> Passed | Failed(msg) | Errored(e)  │
//! │  SuiteReport::push    -> Mismatch { message } | Fault(e)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PageOpener backends                                        │
//! │    ├── StaticHtmlOpener  (HTTP fetch + inline styles)       │
//! │    └── PlaywrightOpener  (real browser via Node)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod filter;
pub mod page;
pub mod playwright;
pub mod report;
pub mod rule;
pub mod runner;
pub mod spec;
pub mod static_html;

pub use config::{ConfigError, Declaration, RunnerConfig, SuiteFile, Viewport};
pub use error::{RunnerError, RunnerResult};
pub use executor::Outcome;
pub use page::{ElementBox, PageOpener, PageRequest, RenderedPage};
pub use report::{write_reports, FailureCause, SuiteReport, TestReport, TestStatus};
pub use runner::SpecRunner;
pub use spec::{load_spec, Check, LayoutSpec, Section};
