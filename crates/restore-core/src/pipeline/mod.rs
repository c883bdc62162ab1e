pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{deconvolve_frame, run_pipeline, run_pipeline_reported};
pub use types::{PipelineStage, ProgressReporter, RestoreReport};
