use std::fmt;

use crate::restoration::GibbsChains;

/// Step of a restore run, as announced to a [`ProgressReporter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Reading,
    Deconvolving,
    Writing,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Reading => "Reading image",
            Self::Deconvolving => "Deconvolving",
            Self::Writing => "Writing output",
        };
        f.write_str(label)
    }
}

/// Outcome of [`run_pipeline`](super::run_pipeline).
#[derive(Clone, Debug)]
pub struct RestoreReport {
    pub width: usize,
    pub height: usize,
    /// Present when the unsupervised method ran.
    pub chains: Option<GibbsChains>,
}

/// Observer for a restore run. Shared across threads, so every hook takes
/// `&self`; the defaults do nothing.
pub trait ProgressReporter: Send + Sync {
    /// `total_items` is the iteration cap for the Gibbs sampler, `None` for
    /// stages without countable work.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// `items_done` counts completed items within the current stage.
    fn advance(&self, _items_done: usize) {}

    fn finish_stage(&self) {}
}

pub(super) struct SilentReporter;

impl ProgressReporter for SilentReporter {}
