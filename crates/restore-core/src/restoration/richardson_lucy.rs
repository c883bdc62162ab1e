use ndarray::{Array, ArrayBase, ArrayD, Axis, Data, Dimension, IxDyn, Slice, Zip};
use num_complex::Complex;
use tracing::debug;

use crate::error::{RestoreError, Result};
use crate::float::Real;

use super::uft::{irfftn, rfftn, Norm};

/// Zero-padded linear convolution cropped to the input shape ("same" mode),
/// with the kernel and its mirror transformed once up front.
struct SameConvolver<F> {
    image_shape: Vec<usize>,
    padded_shape: Vec<usize>,
    offsets: Vec<usize>,
    kernel_tf: ArrayD<Complex<F>>,
    mirror_tf: ArrayD<Complex<F>>,
}

fn zero_pad<F: Real>(data: &ArrayD<F>, shape: &[usize]) -> ArrayD<F> {
    let mut out = ArrayD::<F>::zeros(IxDyn(shape));
    out.slice_each_axis_mut(|ax| Slice::from(0..data.shape()[ax.axis.index()]))
        .assign(data);
    out
}

impl<F: Real> SameConvolver<F> {
    fn new(image_shape: &[usize], kernel: &ArrayD<F>) -> Result<Self> {
        let padded_shape: Vec<usize> = image_shape
            .iter()
            .zip(kernel.shape())
            .map(|(&n, &k)| n + k - 1)
            .collect();
        let offsets = kernel.shape().iter().map(|&k| (k - 1) / 2).collect();

        let mut mirror = kernel.clone();
        for ax in 0..mirror.ndim() {
            mirror.invert_axis(Axis(ax));
        }

        let (kernel_tf, mirror_tf) = rayon::join(
            || rfftn(&zero_pad(kernel, &padded_shape), Norm::Backward),
            || rfftn(&zero_pad(&mirror, &padded_shape), Norm::Backward),
        );

        Ok(Self {
            image_shape: image_shape.to_vec(),
            padded_shape,
            offsets,
            kernel_tf: kernel_tf?,
            mirror_tf: mirror_tf?,
        })
    }

    fn apply(&self, data: &ArrayD<F>, mirrored: bool) -> Result<ArrayD<F>> {
        let tf = if mirrored {
            &self.mirror_tf
        } else {
            &self.kernel_tf
        };
        let mut spectrum = rfftn(&zero_pad(data, &self.padded_shape), Norm::Backward)?;
        spectrum.zip_mut_with(tf, |s, h| *s = *s * *h);
        let full = irfftn(&spectrum, &self.padded_shape, Norm::Backward)?;

        let same = full.slice_each_axis(|ax| {
            let i = ax.axis.index();
            Slice::from(self.offsets[i]..self.offsets[i] + self.image_shape[i])
        });
        Ok(same.to_owned())
    }

    fn convolve(&self, data: &ArrayD<F>) -> Result<ArrayD<F>> {
        self.apply(data, false)
    }

    fn correlate(&self, data: &ArrayD<F>) -> Result<ArrayD<F>> {
        self.apply(data, true)
    }
}

/// Richardson-Lucy deconvolution.
///
/// The estimate starts as the observed image and is updated `num_iter` times:
/// `estimate *= (image / (estimate ⊛ psf)) ⋆ psf`. Convolutions are
/// zero-padded and cropped back to the image shape.
///
/// With `filter_epsilon`, ratio entries whose blurred estimate is smaller in
/// magnitude than the epsilon are set to zero instead of dividing. Without
/// it, zero denominators propagate as non-finite values.
///
/// The PSF may be stored in a different precision than the image; it is
/// cast to the image's precision before use.
pub fn richardson_lucy<F, P, S, T, D, E>(
    image: &ArrayBase<S, D>,
    psf: &ArrayBase<T, E>,
    num_iter: usize,
    filter_epsilon: Option<F>,
) -> Result<Array<F, D>>
where
    F: Real,
    P: Real,
    S: Data<Elem = F>,
    T: Data<Elem = P>,
    D: Dimension,
    E: Dimension,
{
    if psf.ndim() != image.ndim() {
        return Err(RestoreError::DimensionMismatch {
            expected: image.ndim(),
            actual: psf.ndim(),
        });
    }
    if psf.is_empty() {
        return Err(RestoreError::InvalidParameter("empty PSF".into()));
    }
    if image.is_empty() {
        return Err(RestoreError::InvalidParameter(format!(
            "empty image of shape {:?}",
            image.shape()
        )));
    }
    if let Some(eps) = filter_epsilon {
        if !(eps > F::zero()) {
            return Err(RestoreError::InvalidParameter(format!(
                "filter_epsilon must be positive, got {eps}"
            )));
        }
    }

    let observed = image.to_owned().into_dyn();
    let kernel = psf.mapv(|v| F::from_f64_c(v.to_f64_c())).into_dyn();
    let convolver = SameConvolver::new(observed.shape(), &kernel)?;
    debug!(
        shape = ?observed.shape(),
        num_iter,
        filter_epsilon = ?filter_epsilon,
        "Richardson-Lucy deconvolution"
    );

    let mut estimate = observed.clone();
    for _iter in 0..num_iter {
        let blurred = convolver.convolve(&estimate)?;
        let ratio = Zip::from(&observed)
            .and(&blurred)
            .map_collect(|&obs, &b| match filter_epsilon {
                Some(eps) if b.abs() < eps => F::zero(),
                _ => obs / b,
            });
        let correction = convolver.correlate(&ratio)?;
        estimate.zip_mut_with(&correction, |e, &c| *e *= c);
    }

    Ok(estimate.into_dimensionality::<D>()?)
}
