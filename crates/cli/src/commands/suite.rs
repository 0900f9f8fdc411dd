//! Run suites declared in TOML suite files

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use layoutspec_runner::{SpecRunner, SuiteFile};

use super::{finish, BackendArgs};
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct SuiteArgs {
    /// Suite file, or a directory searched for *.toml suite files
    pub path: PathBuf,

    /// Directory to write JSON results to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub backend: BackendArgs,
}

pub async fn execute(args: SuiteArgs, format: OutputFormat) -> Result<bool> {
    let declarations = if args.path.is_dir() {
        SuiteFile::discover(&args.path)
    } else {
        SuiteFile::load(&args.path)
    }
    .with_context(|| format!("loading suites from {}", args.path.display()))?;

    info!("Found {} suite(s) in {}", declarations.len(), args.path.display());

    let runner = SpecRunner::with_opener(args.backend.opener().await?);
    let reports = runner.run_all(&declarations).await;
    finish(&reports, format, args.output.as_ref())
}
