pub mod richardson_lucy;
pub mod uft;
pub mod unsupervised;
pub mod wiener;

use ndarray::{Array, Array2, ArrayD, Dimension};
use num_complex::Complex;
use tracing::info;

use crate::consts::CLIP_LIMIT;
use crate::error::{RestoreError, Result};
use crate::float::Real;
use crate::pipeline::config::{DeconvolutionConfig, DeconvolutionMethod};
use crate::psf::generate_psf;

pub use richardson_lucy::richardson_lucy;
pub use unsupervised::{
    unsupervised_wiener, unsupervised_wiener_with_rng, GibbsChains, IterationCallback,
    IterationState, UnsupervisedParams,
};
pub use wiener::wiener;

use uft::{ir2tf, laplacian_with, spectrum_shape, ufftn, uifftn, uirfftn, urfftn};

/// Blur operator handed to the Wiener routines.
#[derive(Clone, Debug)]
pub enum Blur<F> {
    /// Real-space point-spread function, zero-padded and transformed on use.
    Psf(ArrayD<F>),
    /// Precomputed transfer function, already on the image's spectral grid.
    Otf(ArrayD<Complex<F>>),
}

impl<F: Real> Blur<F> {
    pub fn psf<D: Dimension>(psf: &Array<F, D>) -> Self {
        Blur::Psf(psf.clone().into_dyn())
    }

    pub fn otf(otf: ArrayD<Complex<F>>) -> Self {
        Blur::Otf(otf)
    }
}

/// Regularization operator for the Wiener routines.
#[derive(Clone, Debug)]
pub enum Regularizer<F> {
    /// Real-space impulse response (e.g. a Laplacian stencil).
    Impulse(ArrayD<F>),
    /// Precomputed transfer function on the image's spectral grid.
    Transfer(ArrayD<Complex<F>>),
}

fn check_spectral<F>(
    what: &'static str,
    tf: &ArrayD<Complex<F>>,
    expected: &[usize],
) -> Result<()> {
    if tf.shape() != expected {
        return Err(RestoreError::ShapeMismatch {
            what,
            expected: expected.to_vec(),
            actual: tf.shape().to_vec(),
        });
    }
    Ok(())
}

/// Resolve the blur and regularizer into transfer functions on the spectral
/// grid of an image of `shape`.
pub(crate) fn resolve_operators<F: Real>(
    shape: &[usize],
    blur: &Blur<F>,
    reg: Option<&Regularizer<F>>,
    is_real: bool,
) -> Result<(ArrayD<Complex<F>>, ArrayD<Complex<F>>)> {
    let spectral = spectrum_shape(shape, is_real);

    let reg = match reg {
        None => laplacian_with::<F>(shape.len(), shape, is_real)?.transfer,
        Some(Regularizer::Impulse(ir)) => ir2tf(ir, shape, is_real)?,
        Some(Regularizer::Transfer(tf)) => {
            check_spectral("regularizer", tf, &spectral)?;
            tf.clone()
        }
    };

    let trans = match blur {
        Blur::Psf(psf) => ir2tf(psf, shape, is_real)?,
        Blur::Otf(otf) => {
            check_spectral("transfer function", otf, &spectral)?;
            otf.clone()
        }
    };

    Ok((trans, reg))
}

/// Unitary spectrum of a real image (half spectrum when `is_real`).
pub(crate) fn forward<F: Real>(image: &ArrayD<F>, is_real: bool) -> Result<ArrayD<Complex<F>>> {
    if is_real {
        urfftn(image)
    } else {
        Ok(ufftn(&image.mapv(|v| Complex::new(v, F::zero()))))
    }
}

/// Back to image space. The complex path keeps the real part.
pub(crate) fn inverse<F: Real>(
    spectrum: &ArrayD<Complex<F>>,
    shape: &[usize],
    is_real: bool,
) -> Result<ArrayD<F>> {
    if is_real {
        uirfftn(spectrum, shape)
    } else {
        Ok(uifftn(spectrum).mapv(|v| v.re))
    }
}

/// Clip values into `[-1, 1]`.
pub fn clip_in_place<F: Real, D: Dimension>(data: &mut Array<F, D>) {
    let limit = F::from_f64_c(CLIP_LIMIT);
    data.mapv_inplace(|v| v.max(-limit).min(limit));
}

/// Result of a config-driven deconvolution.
#[derive(Clone, Debug)]
pub struct Deconvolution<F> {
    pub image: Array2<F>,
    /// Hyperparameter chains, present for the unsupervised method.
    pub chains: Option<GibbsChains>,
}

/// Generate the PSF and dispatch to the configured deconvolution algorithm.
pub fn deconvolve<F: Real>(image: &Array2<F>, config: &DeconvolutionConfig) -> Result<Array2<F>> {
    Ok(deconvolve_with(image, config, None)?.image)
}

/// Like [`deconvolve`], forwarding Gibbs iterations to `callback`.
pub fn deconvolve_with<F: Real>(
    image: &Array2<F>,
    config: &DeconvolutionConfig,
    callback: Option<IterationCallback<F>>,
) -> Result<Deconvolution<F>> {
    let psf = generate_psf::<F>(&config.psf)?;
    let (h, w) = image.dim();
    info!(width = w, height = h, method = %config.method, psf = %config.psf, "Deconvolving");

    let (mut restored, chains) = match &config.method {
        DeconvolutionMethod::Wiener { balance } => {
            let out = wiener(image, &Blur::psf(&psf), F::from_f64_c(*balance), None, true)?;
            (out, None)
        }
        DeconvolutionMethod::UnsupervisedWiener(unsup) => {
            let mut params = unsup.to_params::<F>();
            params.callback = callback;
            let (out, chains) =
                unsupervised_wiener(image, &Blur::psf(&psf), None, Some(&params), true)?;
            (out, Some(chains))
        }
        DeconvolutionMethod::RichardsonLucy {
            iterations,
            filter_epsilon,
        } => {
            let eps = filter_epsilon.map(F::from_f64_c);
            (richardson_lucy(image, &psf, *iterations, eps)?, None)
        }
    };

    if config.clip {
        clip_in_place(&mut restored);
    }

    Ok(Deconvolution {
        image: restored,
        chains,
    })
}
