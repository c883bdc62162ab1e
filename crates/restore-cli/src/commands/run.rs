use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use restore_core::pipeline::config::RestoreConfig;
use tracing::debug;

use super::deconvolve::execute;

#[derive(Args)]
pub struct RunArgs {
    /// Restore config file (TOML)
    pub config: PathBuf,

    /// Override the input image from the config
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Override the output path from the config
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let contents = std::fs::read_to_string(&args.config)
        .with_context(|| format!("Failed to read config {}", args.config.display()))?;
    let mut config: RestoreConfig = toml::from_str(&contents).context("Invalid restore config")?;
    debug!(path = %args.config.display(), method = %config.deconvolution.method, "Config loaded");

    if let Some(ref input) = args.input {
        config.input = input.clone();
    }
    if let Some(ref output) = args.output {
        config.output = output.clone();
    }

    execute(&config)
}
