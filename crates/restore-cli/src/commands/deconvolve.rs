use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use restore_core::consts::{
    DEFAULT_GIBBS_BURNIN, DEFAULT_GIBBS_MAX_ITER, DEFAULT_GIBBS_MIN_ITER, DEFAULT_GIBBS_THRESHOLD,
    DEFAULT_PSF_SIZE, DEFAULT_RL_ITERATIONS, DEFAULT_WIENER_BALANCE,
};
use restore_core::pipeline::config::{
    DeconvolutionConfig, DeconvolutionMethod, Precision, RestoreConfig, UnsupervisedConfig,
};
use restore_core::pipeline::run_pipeline_reported;
use restore_core::psf::PsfModel;

use crate::progress::BarReporter;
use crate::summary::{print_chains_summary, print_restore_summary};

#[derive(Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Wiener,
    Unsupervised,
    Rl,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PsfArg {
    Uniform,
    Gaussian,
    Airy,
}

#[derive(Args)]
pub struct DeconvolveArgs {
    /// Input image file (TIFF or PNG)
    pub file: PathBuf,

    /// Deconvolution method
    #[arg(long, value_enum, default_value = "wiener")]
    pub method: MethodArg,

    /// PSF model
    #[arg(long, value_enum, default_value = "uniform")]
    pub psf: PsfArg,

    /// PSF kernel size in pixels (odd)
    #[arg(long, default_value_t = DEFAULT_PSF_SIZE)]
    pub psf_size: usize,

    /// Gaussian PSF sigma in pixels
    #[arg(long, default_value = "1.0")]
    pub psf_sigma: f64,

    /// Airy first dark ring radius in pixels
    #[arg(long, default_value = "2.5")]
    pub airy_radius: f64,

    /// Wiener regularization balance
    #[arg(long, default_value_t = DEFAULT_WIENER_BALANCE)]
    pub balance: f64,

    /// Richardson-Lucy iteration count
    #[arg(long, default_value_t = DEFAULT_RL_ITERATIONS)]
    pub iterations: usize,

    /// Richardson-Lucy: zero the update where the blurred estimate is below this
    #[arg(long)]
    pub filter_epsilon: Option<f64>,

    /// Gibbs iterations discarded before averaging
    #[arg(long, default_value_t = DEFAULT_GIBBS_BURNIN)]
    pub burnin: usize,

    /// Minimum Gibbs iterations before a convergence stop
    #[arg(long, default_value_t = DEFAULT_GIBBS_MIN_ITER)]
    pub min_iter: usize,

    /// Maximum Gibbs iterations
    #[arg(long, default_value_t = DEFAULT_GIBBS_MAX_ITER)]
    pub max_iter: usize,

    /// Gibbs convergence threshold
    #[arg(long, default_value_t = DEFAULT_GIBBS_THRESHOLD)]
    pub threshold: f64,

    /// Seed for the Gibbs sampler
    #[arg(long)]
    pub seed: Option<u64>,

    /// Compute in double precision
    #[arg(long)]
    pub double: bool,

    /// Keep values outside [-1, 1]
    #[arg(long)]
    pub no_clip: bool,

    /// Output file path
    #[arg(short, long, default_value = "restored.tiff")]
    pub output: PathBuf,
}

pub fn run(args: &DeconvolveArgs) -> Result<()> {
    let config = RestoreConfig {
        input: args.file.clone(),
        output: args.output.clone(),
        deconvolution: build_deconvolution(args),
    };
    execute(&config)
}

/// Print the summary, run the pipeline with progress bars, report the result.
pub fn execute(config: &RestoreConfig) -> Result<()> {
    print_restore_summary(config);

    let report = run_pipeline_reported(config, Arc::new(BarReporter::new()))
        .with_context(|| format!("Failed to restore {}", config.input.display()))?;

    if let Some(ref chains) = report.chains {
        print_chains_summary(chains);
    }
    println!(
        "Restored {}x{} image saved to {}",
        report.width,
        report.height,
        config.output.display()
    );
    Ok(())
}

fn build_deconvolution(args: &DeconvolveArgs) -> DeconvolutionConfig {
    let method = match args.method {
        MethodArg::Wiener => DeconvolutionMethod::Wiener {
            balance: args.balance,
        },
        MethodArg::Unsupervised => DeconvolutionMethod::UnsupervisedWiener(UnsupervisedConfig {
            threshold: args.threshold,
            burnin: args.burnin,
            min_num_iter: args.min_iter,
            max_num_iter: args.max_iter,
            seed: args.seed,
        }),
        MethodArg::Rl => DeconvolutionMethod::RichardsonLucy {
            iterations: args.iterations,
            filter_epsilon: args.filter_epsilon,
        },
    };

    let psf = match args.psf {
        PsfArg::Uniform => PsfModel::Uniform {
            size: args.psf_size,
        },
        PsfArg::Gaussian => PsfModel::Gaussian {
            sigma: args.psf_sigma,
            size: args.psf_size,
        },
        PsfArg::Airy => PsfModel::Airy {
            radius: args.airy_radius,
            size: args.psf_size,
        },
    };

    DeconvolutionConfig {
        method,
        psf,
        clip: !args.no_clip,
        precision: if args.double {
            Precision::Double
        } else {
            Precision::Single
        },
    }
}
