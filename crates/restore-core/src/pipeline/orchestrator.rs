use std::sync::Arc;

use ndarray::Array2;
use tracing::info;

use crate::error::Result;
use crate::float::Real;
use crate::frame::Frame;
use crate::io::image_io::{load_image, save_image};
use crate::restoration::{
    deconvolve_with, Deconvolution, GibbsChains, IterationCallback, IterationState,
};

use super::config::{DeconvolutionConfig, DeconvolutionMethod, Precision, RestoreConfig};
use super::types::{PipelineStage, ProgressReporter, RestoreReport, SilentReporter};

fn gibbs_callback<F: Real>(reporter: &Arc<dyn ProgressReporter>) -> IterationCallback<F> {
    let reporter = Arc::clone(reporter);
    Box::new(move |state: &IterationState<'_, F>| reporter.advance(state.iteration + 1))
}

fn deconvolve_in<F: Real>(
    data: &Array2<F>,
    config: &DeconvolutionConfig,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<Deconvolution<F>> {
    let callback = matches!(config.method, DeconvolutionMethod::UnsupervisedWiener(_))
        .then(|| gibbs_callback::<F>(reporter));
    deconvolve_with(data, config, callback)
}

/// Deconvolve a frame in the configured precision.
pub fn deconvolve_frame(
    frame: &Frame,
    config: &DeconvolutionConfig,
    reporter: &Arc<dyn ProgressReporter>,
) -> Result<(Frame, Option<GibbsChains>)> {
    let (data, chains) = match config.precision {
        Precision::Single => {
            let result = deconvolve_in(&frame.data, config, reporter)?;
            (result.image, result.chains)
        }
        Precision::Double => {
            let result = deconvolve_in(&frame.data.mapv(f64::from), config, reporter)?;
            (result.image.mapv(|v| v as f32), result.chains)
        }
    };
    Ok((frame.with_data(data), chains))
}

/// Run load → deconvolve → save with a thread-safe progress reporter.
pub fn run_pipeline_reported(
    config: &RestoreConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<RestoreReport> {
    reporter.begin_stage(PipelineStage::Reading, None);
    let frame = load_image(&config.input)?;
    reporter.finish_stage();
    info!(
        input = %config.input.display(),
        width = frame.width(),
        height = frame.height(),
        "Image loaded"
    );

    let deconv = &config.deconvolution;
    let total = match &deconv.method {
        DeconvolutionMethod::UnsupervisedWiener(cfg) => Some(cfg.max_num_iter),
        _ => None,
    };
    reporter.begin_stage(PipelineStage::Deconvolving, total);
    let (restored, chains) = deconvolve_frame(&frame, deconv, &reporter)?;
    reporter.finish_stage();
    info!(method = %deconv.method, precision = %deconv.precision, "Deconvolution complete");

    reporter.begin_stage(PipelineStage::Writing, None);
    save_image(&restored, &config.output)?;
    reporter.finish_stage();
    info!(output = %config.output.display(), "Output saved");

    Ok(RestoreReport {
        width: restored.width(),
        height: restored.height(),
        chains,
    })
}

/// Run the full pipeline without progress reporting.
pub fn run_pipeline(config: &RestoreConfig) -> Result<RestoreReport> {
    run_pipeline_reported(config, Arc::new(SilentReporter))
}
