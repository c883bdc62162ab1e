//! Unsupervised Wiener-Hunt deconvolution.
//!
//! Gibbs sampler over the restored spectrum `x` and two precisions: the
//! noise precision `gn` and the image prior precision `gx`. Each iteration
//! draws
//!
//! ```text
//! x  | gn, gx, y ~ N(gn H* y / Q, 1 / Q)          Q = gn |H|^2 + gx |R|^2
//! gn | x, y     ~ Gamma(N / 2,       2 / ||y - H x||^2)
//! gx | x        ~ Gamma((N - 1) / 2, 2 / ||R x||^2)
//! ```
//!
//! with `N` the pixel count (Orieux, Giovannelli, Rodet 2010). Samples past
//! the burn-in are averaged into the posterior mean, and the chain stops once
//! that mean settles or the iteration cap is hit.

use std::fmt;

use ndarray::{Array, ArrayBase, ArrayD, Data, Dimension, IxDyn, Zip};
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Gamma, StandardNormal};
use tracing::{debug, info};

use crate::consts::{
    DEFAULT_GIBBS_BURNIN, DEFAULT_GIBBS_MAX_ITER, DEFAULT_GIBBS_MIN_ITER, DEFAULT_GIBBS_THRESHOLD,
};
use crate::error::{RestoreError, Result};
use crate::float::Real;

use super::uft::{image_quad_norm, spectrum_shape};
use super::{forward, inverse, resolve_operators, Blur, Regularizer};

/// Snapshot handed to the per-iteration callback.
pub struct IterationState<'a, F> {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Current spectral sample of the restored image.
    pub sample: &'a ArrayD<Complex<F>>,
    /// Noise precision used to draw `sample`.
    pub noise_precision: f64,
    /// Prior precision used to draw `sample`.
    pub prior_precision: f64,
}

/// Per-iteration observer, called synchronously after each sample is drawn.
pub type IterationCallback<F> = Box<dyn Fn(&IterationState<'_, F>) + Send + Sync>;

/// Sampler settings.
pub struct UnsupervisedParams<F> {
    /// Stop once the relative change of the posterior mean drops below this.
    pub threshold: f64,
    /// Iterations discarded before averaging.
    pub burnin: usize,
    /// No convergence stop before this many iterations.
    pub min_num_iter: usize,
    /// Hard iteration cap.
    pub max_num_iter: usize,
    /// Seed for the sampler. `None` draws a fresh seed from the thread RNG.
    pub seed: Option<u64>,
    pub callback: Option<IterationCallback<F>>,
}

impl<F> Default for UnsupervisedParams<F> {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_GIBBS_THRESHOLD,
            burnin: DEFAULT_GIBBS_BURNIN,
            min_num_iter: DEFAULT_GIBBS_MIN_ITER,
            max_num_iter: DEFAULT_GIBBS_MAX_ITER,
            seed: None,
            callback: None,
        }
    }
}

impl<F> fmt::Debug for UnsupervisedParams<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnsupervisedParams")
            .field("threshold", &self.threshold)
            .field("burnin", &self.burnin)
            .field("min_num_iter", &self.min_num_iter)
            .field("max_num_iter", &self.max_num_iter)
            .field("seed", &self.seed)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl<F> UnsupervisedParams<F> {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_callback<C>(mut self, callback: C) -> Self
    where
        C: Fn(&IterationState<'_, F>) + Send + Sync + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    fn validate(&self) -> Result<()> {
        // the first sample is averaged at iteration `burnin + 1`
        if self.max_num_iter < self.burnin + 2 {
            return Err(RestoreError::InvalidParameter(format!(
                "max_num_iter ({}) must exceed burnin + 1 ({})",
                self.max_num_iter,
                self.burnin + 1
            )));
        }
        if !(self.threshold >= 0.0) {
            return Err(RestoreError::InvalidParameter(format!(
                "threshold must be non-negative, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Hyperparameter chains of a finished run.
///
/// Both chains start with the initial value `1.0`; entry `k + 1` is the value
/// drawn at iteration `k`.
#[derive(Clone, Debug, PartialEq)]
pub struct GibbsChains {
    pub noise: Vec<f64>,
    pub prior: Vec<f64>,
    pub burnin: usize,
    /// Iterations actually run.
    pub iterations: usize,
    /// Whether the run stopped on the threshold rather than the cap.
    pub converged: bool,
}

impl GibbsChains {
    fn new(burnin: usize) -> Self {
        Self {
            noise: vec![1.0],
            prior: vec![1.0],
            burnin,
            iterations: 0,
            converged: false,
        }
    }

    /// Last noise precision drawn.
    pub fn noise_precision(&self) -> f64 {
        self.noise.last().copied().unwrap_or(1.0)
    }

    /// Last prior precision drawn.
    pub fn prior_precision(&self) -> f64 {
        self.prior.last().copied().unwrap_or(1.0)
    }

    /// Mean noise precision over the averaged (post burn-in) draws.
    pub fn mean_noise_precision(&self) -> f64 {
        post_burnin_mean(&self.noise, self.burnin)
    }

    /// Mean prior precision over the averaged (post burn-in) draws.
    pub fn mean_prior_precision(&self) -> f64 {
        post_burnin_mean(&self.prior, self.burnin)
    }

    /// Regularization weight equivalent to the final precisions (`gx / gn`).
    pub fn balance(&self) -> f64 {
        self.prior_precision() / self.noise_precision()
    }
}

fn post_burnin_mean(chain: &[f64], burnin: usize) -> f64 {
    match chain.get(burnin + 2..) {
        Some(tail) if !tail.is_empty() => tail.iter().sum::<f64>() / tail.len() as f64,
        _ => chain.last().copied().unwrap_or(1.0),
    }
}

/// Running sum of spectral samples.
struct PosteriorAccumulator<F> {
    sum: ArrayD<Complex<F>>,
    count: usize,
}

impl<F: Real> PosteriorAccumulator<F> {
    fn new(shape: &[usize]) -> Self {
        Self {
            sum: ArrayD::zeros(IxDyn(shape)),
            count: 0,
        }
    }

    /// Add a sample. Returns the relative change of the mean once two or
    /// more samples have been seen.
    fn push(&mut self, sample: &ArrayD<Complex<F>>) -> Option<f64> {
        self.count += 1;
        if self.count == 1 {
            self.sum.zip_mut_with(sample, |s, x| *s = *s + *x);
            return None;
        }

        let current_scale = F::one() / F::usize_as(self.count);
        let previous_scale = F::one() / F::usize_as(self.count - 1);
        let mut change = 0.0f64;
        let mut magnitude = 0.0f64;
        Zip::from(&mut self.sum).and(sample).for_each(|s, x| {
            let previous = *s * previous_scale;
            *s = *s + *x;
            change += (*s * current_scale - previous).norm().to_f64_c();
            magnitude += s.norm().to_f64_c();
        });

        Some(change / magnitude / self.count as f64)
    }

    fn mean(&self) -> ArrayD<Complex<F>> {
        let scale = F::one() / F::usize_as(self.count.max(1));
        self.sum.mapv(|v| v * scale)
    }
}

fn sample_gamma<R: Rng>(rng: &mut R, shape: f64, scale: f64) -> Result<f64> {
    // zero residual or prior energy
    if !scale.is_finite() {
        return Err(RestoreError::Sampling(format!(
            "Gamma scale is not finite ({scale})"
        )));
    }
    let gamma = Gamma::new(shape, scale).map_err(|e| {
        RestoreError::Sampling(format!("Gamma(shape={shape}, scale={scale}): {e}"))
    })?;
    Ok(rng.sample(gamma))
}

/// Unsupervised Wiener-Hunt deconvolution.
///
/// Returns the posterior-mean image and the hyperparameter chains. The
/// sampler is seeded from `user_params.seed` when set; otherwise the result
/// varies between calls.
pub fn unsupervised_wiener<F, S, D>(
    image: &ArrayBase<S, D>,
    blur: &Blur<F>,
    reg: Option<&Regularizer<F>>,
    user_params: Option<&UnsupervisedParams<F>>,
    is_real: bool,
) -> Result<(Array<F, D>, GibbsChains)>
where
    F: Real,
    S: Data<Elem = F>,
    D: Dimension,
{
    let seed = user_params.and_then(|p| p.seed);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    unsupervised_wiener_with_rng(image, blur, reg, user_params, is_real, &mut rng)
}

/// [`unsupervised_wiener`] drawing from a caller-owned generator.
///
/// `user_params.seed` is ignored here.
pub fn unsupervised_wiener_with_rng<F, S, D, R>(
    image: &ArrayBase<S, D>,
    blur: &Blur<F>,
    reg: Option<&Regularizer<F>>,
    user_params: Option<&UnsupervisedParams<F>>,
    is_real: bool,
    rng: &mut R,
) -> Result<(Array<F, D>, GibbsChains)>
where
    F: Real,
    S: Data<Elem = F>,
    D: Dimension,
    R: Rng,
{
    let defaults = UnsupervisedParams::default();
    let params = user_params.unwrap_or(&defaults);
    params.validate()?;

    let shape = image.shape().to_vec();
    let pixels = image.len();
    let half_len = shape.last().copied().filter(|_| is_real);
    debug!(shape = ?shape, is_real, params = ?params, "Unsupervised Wiener deconvolution");

    let (trans, reg) = resolve_operators(&shape, blur, reg, is_real)?;
    let atf2 = trans.mapv(|h| h.norm_sqr());
    let areg2 = reg.mapv(|r| r.norm_sqr());
    let data_spectrum = forward(&image.to_owned().into_dyn(), is_real)?;

    let spectral = spectrum_shape(&shape, is_real);
    let mut chains = GibbsChains::new(params.burnin);
    let mut accumulator = PosteriorAccumulator::<F>::new(&spectral);
    let mut sample = ArrayD::<Complex<F>>::zeros(IxDyn(&spectral));
    let mut delta = f64::NAN;
    let half = F::from_f64_c(0.5);

    for iteration in 0..params.max_num_iter {
        let gn = chains.noise_precision();
        let gx = chains.prior_precision();
        let gn_f = F::from_f64_c(gn);
        let gx_f = F::from_f64_c(gx);

        // x ~ N(mean, 1/precision), complex excursion split over re and im
        Zip::from(&mut sample)
            .and(&trans)
            .and(&atf2)
            .and(&areg2)
            .and(&data_spectrum)
            .for_each(|x, h, &a, &r, y| {
                let precision = gn_f * a + gx_f * r;
                let spread = (half / precision).sqrt();
                let n1: f64 = rng.sample(StandardNormal);
                let n2: f64 = rng.sample(StandardNormal);
                let excursion = Complex::new(F::from_f64_c(n1), F::from_f64_c(n2)) * spread;
                *x = h.conj() * *y * (gn_f / precision) + excursion;
            });

        if let Some(callback) = &params.callback {
            callback(&IterationState {
                iteration,
                sample: &sample,
                noise_precision: gn,
                prior_precision: gx,
            });
        }

        let residual = Zip::from(&data_spectrum)
            .and(&sample)
            .and(&trans)
            .map_collect(|y, x, h| *y - *x * *h);
        let residual_energy = image_quad_norm(&residual, half_len).to_f64_c();
        let regularized = Zip::from(&sample).and(&reg).map_collect(|x, r| *x * *r);
        let prior_energy = image_quad_norm(&regularized, half_len).to_f64_c();

        chains
            .noise
            .push(sample_gamma(rng, pixels as f64 / 2.0, 2.0 / residual_energy)?);
        chains
            .prior
            .push(sample_gamma(rng, (pixels as f64 - 1.0) / 2.0, 2.0 / prior_energy)?);
        chains.iterations = iteration + 1;

        if iteration > params.burnin {
            if let Some(change) = accumulator.push(&sample) {
                delta = change;
            }
        }

        debug!(
            iteration,
            noise = chains.noise_precision(),
            prior = chains.prior_precision(),
            delta,
            "Gibbs iteration"
        );

        if iteration > params.min_num_iter && delta < params.threshold {
            chains.converged = true;
            break;
        }
    }

    info!(
        iterations = chains.iterations,
        converged = chains.converged,
        noise = chains.noise_precision(),
        prior = chains.prior_precision(),
        "Gibbs sampling complete"
    );

    let restored = inverse(&accumulator.mean(), &shape, is_real)?;
    Ok((restored.into_dimensionality::<D>()?, chains))
}
