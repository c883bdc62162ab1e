use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_GIBBS_BURNIN, DEFAULT_GIBBS_MAX_ITER, DEFAULT_GIBBS_MIN_ITER, DEFAULT_GIBBS_THRESHOLD,
    DEFAULT_WIENER_BALANCE,
};
use crate::psf::PsfModel;
use crate::restoration::UnsupervisedParams;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestoreConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub deconvolution: DeconvolutionConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeconvolutionConfig {
    #[serde(default)]
    pub method: DeconvolutionMethod,
    #[serde(default)]
    pub psf: PsfModel,
    /// Clip the result into `[-1, 1]`.
    #[serde(default = "default_clip")]
    pub clip: bool,
    #[serde(default)]
    pub precision: Precision,
}

fn default_clip() -> bool {
    true
}

impl Default for DeconvolutionConfig {
    fn default() -> Self {
        Self {
            method: DeconvolutionMethod::default(),
            psf: PsfModel::default(),
            clip: true,
            precision: Precision::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum DeconvolutionMethod {
    Wiener {
        balance: f64,
    },
    UnsupervisedWiener(UnsupervisedConfig),
    RichardsonLucy {
        iterations: usize,
        #[serde(default)]
        filter_epsilon: Option<f64>,
    },
}

impl Default for DeconvolutionMethod {
    fn default() -> Self {
        DeconvolutionMethod::Wiener {
            balance: DEFAULT_WIENER_BALANCE,
        }
    }
}

impl fmt::Display for DeconvolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wiener { balance } => write!(f, "Wiener (balance={balance})"),
            Self::UnsupervisedWiener(cfg) => {
                write!(f, "Unsupervised Wiener (burn-in={}, max={})", cfg.burnin, cfg.max_num_iter)
            }
            Self::RichardsonLucy {
                iterations,
                filter_epsilon: Some(eps),
            } => write!(f, "Richardson-Lucy ({iterations} iter, eps={eps})"),
            Self::RichardsonLucy { iterations, .. } => {
                write!(f, "Richardson-Lucy ({iterations} iter)")
            }
        }
    }
}

/// Serializable subset of [`UnsupervisedParams`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnsupervisedConfig {
    pub threshold: f64,
    pub burnin: usize,
    pub min_num_iter: usize,
    pub max_num_iter: usize,
    pub seed: Option<u64>,
}

impl Default for UnsupervisedConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_GIBBS_THRESHOLD,
            burnin: DEFAULT_GIBBS_BURNIN,
            min_num_iter: DEFAULT_GIBBS_MIN_ITER,
            max_num_iter: DEFAULT_GIBBS_MAX_ITER,
            seed: None,
        }
    }
}

impl UnsupervisedConfig {
    pub fn to_params<F>(&self) -> UnsupervisedParams<F> {
        UnsupervisedParams {
            threshold: self.threshold,
            burnin: self.burnin,
            min_num_iter: self.min_num_iter,
            max_num_iter: self.max_num_iter,
            seed: self.seed,
            callback: None,
        }
    }
}

/// Floating point precision the deconvolution runs in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    #[default]
    Single,
    Double,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "f32"),
            Self::Double => write!(f, "f64"),
        }
    }
}
