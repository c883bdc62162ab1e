use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use restore_core::consts::DEFAULT_RL_ITERATIONS;
use restore_core::pipeline::config::{
    DeconvolutionConfig, DeconvolutionMethod, RestoreConfig, UnsupervisedConfig,
};

use super::deconvolve::MethodArg;

#[derive(Args)]
pub struct ConfigArgs {
    /// Method to template (defaults to wiener)
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a default RestoreConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let method = match args.method {
        None | Some(MethodArg::Wiener) => DeconvolutionMethod::default(),
        Some(MethodArg::Unsupervised) => {
            DeconvolutionMethod::UnsupervisedWiener(UnsupervisedConfig::default())
        }
        Some(MethodArg::Rl) => DeconvolutionMethod::RichardsonLucy {
            iterations: DEFAULT_RL_ITERATIONS,
            filter_epsilon: None,
        },
    };
    let config = RestoreConfig {
        input: PathBuf::from("input.tiff"),
        output: PathBuf::from("restored.tiff"),
        deconvolution: DeconvolutionConfig {
            method,
            ..Default::default()
        },
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
