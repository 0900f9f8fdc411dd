//! Run a single suite declared on the command line

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use layoutspec_runner::{Declaration, SpecRunner, Viewport};

use super::{finish, BackendArgs};
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Suite name for the report (defaults to the spec file stem)
    #[arg(long)]
    pub name: Option<String>,

    /// Layout spec document
    #[arg(long)]
    pub spec: Option<String>,

    /// Page to check
    #[arg(long)]
    pub url: Option<String>,

    /// Viewport as WIDTHxHEIGHT, e.g. 640x480
    #[arg(long, value_parser = parse_viewport)]
    pub size: Option<Viewport>,

    /// Only run sections with one of these tags
    #[arg(long = "include", value_delimiter = ',')]
    pub include: Vec<String>,

    /// Never run sections with one of these tags
    #[arg(long = "exclude", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Directory to write JSON results to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub backend: BackendArgs,
}

impl RunArgs {
    /// Missing values stay missing so the runner reports them
    fn declaration(&self) -> Declaration {
        Declaration {
            name: self.name.clone(),
            spec: self.spec.clone(),
            url: self.url.clone(),
            size: self.size,
            include: self.include.clone(),
            exclude: self.exclude.clone(),
        }
    }
}

pub async fn execute(args: RunArgs, format: OutputFormat) -> Result<bool> {
    let runner = SpecRunner::with_opener(args.backend.opener().await?);
    let report = runner.run(&args.declaration()).await;
    finish(&[report], format, args.output.as_ref())
}

fn parse_viewport(value: &str) -> Result<Viewport, String> {
    let (width, height) = value
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid width '{}': {}", width, e))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid height '{}': {}", height, e))?;
    Ok(Viewport::new(width, height))
}
