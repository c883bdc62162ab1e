//! Unitary Fourier transforms and transfer-function helpers.
//!
//! Image spectra are computed with the orthonormal scaling (`1/sqrt(N)` in
//! both directions) so that the spectral energy equals the spatial energy.
//! Transfer functions built by [`ir2tf`] are plain DFTs of the zero-padded
//! impulse response, which makes `ufftn(h ⊛ x) == ir2tf(h) * ufftn(x)` for
//! circular convolution.
//!
//! Real-input transforms keep only the non-redundant half of the last axis
//! (`n / 2 + 1` bins), matching [`realfft`].

use ndarray::{ArrayD, ArrayViewMut1, Axis, IxDyn, Zip};
use num_complex::Complex;
use realfft::RealFftPlanner;
use rustfft::FftPlanner;

use crate::consts::{LAPLACIAN_CENTER_PER_AXIS, LAPLACIAN_NEIGHBOUR, PARALLEL_PIXEL_THRESHOLD};
use crate::error::{RestoreError, Result};
use crate::float::Real;

/// Scaling convention of a forward/inverse transform pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Norm {
    /// Forward unscaled, inverse scaled by `1/N`.
    Backward,
    /// Both directions scaled by `1/sqrt(N)`.
    Ortho,
}

impl Norm {
    fn forward_scale<F: Real>(self, n: usize) -> Option<F> {
        match self {
            Norm::Backward => None,
            Norm::Ortho => Some(F::one() / F::usize_as(n).sqrt()),
        }
    }

    fn inverse_scale<F: Real>(self, n: usize) -> F {
        match self {
            Norm::Backward => F::one() / F::usize_as(n),
            Norm::Ortho => F::one() / F::usize_as(n).sqrt(),
        }
    }
}

/// Discrete Laplacian regularizer in both domains.
#[derive(Clone, Debug)]
pub struct Laplacian<F> {
    /// `3 x 3 x ...` impulse response.
    pub impulse: ArrayD<F>,
    /// Transfer function of `impulse` on the requested shape.
    pub transfer: ArrayD<Complex<F>>,
}

/// Shape of the spectrum produced for a real image of `shape`.
pub fn spectrum_shape(shape: &[usize], is_real: bool) -> Vec<usize> {
    let mut out = shape.to_vec();
    if is_real {
        if let Some(last) = out.last_mut() {
            *last = *last / 2 + 1;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Axis passes
// ---------------------------------------------------------------------------

fn fft_axis<F: Real>(
    data: &mut ArrayD<Complex<F>>,
    axis: usize,
    planner: &mut FftPlanner<F>,
    inverse: bool,
) {
    let n = data.shape()[axis];
    if n <= 1 {
        return;
    }
    let fft = if inverse {
        planner.plan_fft_inverse(n)
    } else {
        planner.plan_fft_forward(n)
    };

    let process = |mut lane: ArrayViewMut1<Complex<F>>| {
        let mut buf: Vec<Complex<F>> = lane.iter().copied().collect();
        fft.process(&mut buf);
        lane.iter_mut().zip(buf).for_each(|(dst, src)| *dst = src);
    };

    let total = data.len();
    let lanes = data.lanes_mut(Axis(axis));
    if total >= PARALLEL_PIXEL_THRESHOLD {
        Zip::from(lanes).par_for_each(process);
    } else {
        Zip::from(lanes).for_each(process);
    }
}

fn rfft_last_axis<F: Real>(input: &ArrayD<F>) -> Result<ArrayD<Complex<F>>> {
    let last = input.ndim() - 1;
    let n = input.shape()[last];
    let mut output = ArrayD::<Complex<F>>::zeros(IxDyn(&spectrum_shape(input.shape(), true)));

    let mut planner = RealFftPlanner::<F>::new();
    let r2c = planner.plan_fft_forward(n);
    let mut buf = r2c.make_input_vec();
    let mut spectrum = r2c.make_output_vec();

    for (src, mut dst) in input
        .lanes(Axis(last))
        .into_iter()
        .zip(output.lanes_mut(Axis(last)))
    {
        buf.iter_mut().zip(src.iter()).for_each(|(b, &v)| *b = v);
        r2c.process(&mut buf, &mut spectrum)
            .map_err(|e| RestoreError::Fft(e.to_string()))?;
        dst.iter_mut()
            .zip(spectrum.iter())
            .for_each(|(d, &s)| *d = s);
    }

    Ok(output)
}

fn irfft_last_axis<F: Real>(input: &ArrayD<Complex<F>>, n: usize) -> Result<ArrayD<F>> {
    let last = input.ndim() - 1;
    let mut out_shape = input.shape().to_vec();
    out_shape[last] = n;
    let mut output = ArrayD::<F>::zeros(IxDyn(&out_shape));

    let mut planner = RealFftPlanner::<F>::new();
    let c2r = planner.plan_fft_inverse(n);
    let mut spectrum = c2r.make_input_vec();
    let mut buf = c2r.make_output_vec();

    for (src, mut dst) in input
        .lanes(Axis(last))
        .into_iter()
        .zip(output.lanes_mut(Axis(last)))
    {
        spectrum
            .iter_mut()
            .zip(src.iter())
            .for_each(|(s, &v)| *s = v);
        // DC and Nyquist bins of a real signal carry no imaginary part
        spectrum[0].im = F::zero();
        if n % 2 == 0 {
            spectrum[n / 2].im = F::zero();
        }
        c2r.process(&mut spectrum, &mut buf)
            .map_err(|e| RestoreError::Fft(e.to_string()))?;
        dst.iter_mut().zip(buf.iter()).for_each(|(d, &v)| *d = v);
    }

    Ok(output)
}

// ---------------------------------------------------------------------------
// N-dimensional transforms
// ---------------------------------------------------------------------------

/// Complex forward transform over every axis.
pub fn fftn<F: Real>(input: &ArrayD<Complex<F>>, norm: Norm) -> ArrayD<Complex<F>> {
    let mut data = input.clone();
    let mut planner = FftPlanner::new();
    for axis in 0..data.ndim() {
        fft_axis(&mut data, axis, &mut planner, false);
    }
    if let Some(scale) = norm.forward_scale::<F>(data.len()) {
        data.mapv_inplace(|v| v * scale);
    }
    data
}

/// Complex inverse transform over every axis.
pub fn ifftn<F: Real>(input: &ArrayD<Complex<F>>, norm: Norm) -> ArrayD<Complex<F>> {
    let mut data = input.clone();
    let mut planner = FftPlanner::new();
    for axis in 0..data.ndim() {
        fft_axis(&mut data, axis, &mut planner, true);
    }
    let scale = norm.inverse_scale::<F>(data.len());
    data.mapv_inplace(|v| v * scale);
    data
}

/// Real-input forward transform: half spectrum on the last axis, full on the rest.
pub fn rfftn<F: Real>(input: &ArrayD<F>, norm: Norm) -> Result<ArrayD<Complex<F>>> {
    if input.ndim() == 0 {
        return Err(RestoreError::InvalidParameter(
            "cannot transform a zero-dimensional array".into(),
        ));
    }
    let mut data = rfft_last_axis(input)?;
    let mut planner = FftPlanner::new();
    for axis in 0..data.ndim() - 1 {
        fft_axis(&mut data, axis, &mut planner, false);
    }
    if let Some(scale) = norm.forward_scale::<F>(input.len()) {
        data.mapv_inplace(|v| v * scale);
    }
    Ok(data)
}

/// Inverse of [`rfftn`] producing a real array of `shape`.
pub fn irfftn<F: Real>(
    input: &ArrayD<Complex<F>>,
    shape: &[usize],
    norm: Norm,
) -> Result<ArrayD<F>> {
    if input.ndim() != shape.len() || input.ndim() == 0 {
        return Err(RestoreError::DimensionMismatch {
            expected: shape.len(),
            actual: input.ndim(),
        });
    }
    let expected = spectrum_shape(shape, true);
    if input.shape() != expected.as_slice() {
        return Err(RestoreError::ShapeMismatch {
            what: "half spectrum",
            expected,
            actual: input.shape().to_vec(),
        });
    }

    let mut data = input.clone();
    let mut planner = FftPlanner::new();
    for axis in 0..data.ndim() - 1 {
        fft_axis(&mut data, axis, &mut planner, true);
    }
    let mut out = irfft_last_axis(&data, shape[shape.len() - 1])?;
    let scale = norm.inverse_scale::<F>(out.len());
    out.mapv_inplace(|v| v * scale);
    Ok(out)
}

/// Unitary complex forward transform.
pub fn ufftn<F: Real>(input: &ArrayD<Complex<F>>) -> ArrayD<Complex<F>> {
    fftn(input, Norm::Ortho)
}

/// Unitary complex inverse transform.
pub fn uifftn<F: Real>(input: &ArrayD<Complex<F>>) -> ArrayD<Complex<F>> {
    ifftn(input, Norm::Ortho)
}

/// Unitary real-input forward transform.
pub fn urfftn<F: Real>(input: &ArrayD<F>) -> Result<ArrayD<Complex<F>>> {
    rfftn(input, Norm::Ortho)
}

/// Unitary inverse of [`urfftn`].
pub fn uirfftn<F: Real>(input: &ArrayD<Complex<F>>, shape: &[usize]) -> Result<ArrayD<F>> {
    irfftn(input, shape, Norm::Ortho)
}

/// Squared L2 norm of a spectrum.
///
/// With `real_last_len = Some(n)` the input is a half spectrum of a real
/// signal whose last axis had length `n`; the mirrored bins are counted so the
/// result equals the energy of the full spectrum.
pub fn image_quad_norm<F: Real>(spectrum: &ArrayD<Complex<F>>, real_last_len: Option<usize>) -> F {
    let Some(n) = real_last_len else {
        return spectrum.iter().map(|v| v.norm_sqr()).sum();
    };

    let two = F::from_f64_c(2.0);
    let last = spectrum.ndim() - 1;
    spectrum
        .lanes(Axis(last))
        .into_iter()
        .map(|lane| {
            lane.iter()
                .enumerate()
                .map(|(j, v)| {
                    let self_mirrored = j == 0 || (n % 2 == 0 && j == n / 2);
                    if self_mirrored {
                        v.norm_sqr()
                    } else {
                        two * v.norm_sqr()
                    }
                })
                .sum::<F>()
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Transfer functions
// ---------------------------------------------------------------------------

/// Transfer function of an impulse response on an image of `shape`.
///
/// The impulse response is zero-padded to `shape` and rolled so that its
/// center (`floor(k/2)` on each axis) lands on the origin.
pub fn ir2tf<F: Real>(
    psf: &ArrayD<F>,
    shape: &[usize],
    is_real: bool,
) -> Result<ArrayD<Complex<F>>> {
    if psf.ndim() != shape.len() {
        return Err(RestoreError::DimensionMismatch {
            expected: shape.len(),
            actual: psf.ndim(),
        });
    }
    if psf.is_empty() || psf.shape().iter().zip(shape).any(|(&k, &n)| k > n) {
        return Err(RestoreError::ShapeMismatch {
            what: "impulse response",
            expected: shape.to_vec(),
            actual: psf.shape().to_vec(),
        });
    }

    let kernel_shape = psf.shape();
    let mut padded = ArrayD::<F>::zeros(IxDyn(shape));
    let mut target = vec![0usize; shape.len()];
    for (idx, &v) in psf.indexed_iter() {
        for (ax, t) in target.iter_mut().enumerate() {
            *t = (idx[ax] + shape[ax] - kernel_shape[ax] / 2) % shape[ax];
        }
        padded[target.as_slice()] = v;
    }

    if is_real {
        rfftn(&padded, Norm::Backward)
    } else {
        let complex = padded.mapv(|v| Complex::new(v, F::zero()));
        Ok(fftn(&complex, Norm::Backward))
    }
}

/// Discrete Laplacian and its half-spectrum transfer function.
pub fn laplacian<F: Real>(ndim: usize, shape: &[usize]) -> Result<Laplacian<F>> {
    laplacian_with(ndim, shape, true)
}

/// Discrete Laplacian with an explicit choice of half or full spectrum.
pub fn laplacian_with<F: Real>(
    ndim: usize,
    shape: &[usize],
    is_real: bool,
) -> Result<Laplacian<F>> {
    if ndim == 0 {
        return Err(RestoreError::InvalidParameter(
            "laplacian needs at least one dimension".into(),
        ));
    }
    if ndim != shape.len() {
        return Err(RestoreError::DimensionMismatch {
            expected: ndim,
            actual: shape.len(),
        });
    }

    let mut impulse = ArrayD::<F>::zeros(IxDyn(&vec![3; ndim]));
    let center = vec![1usize; ndim];
    for axis in 0..ndim {
        for offset in [0, 2] {
            let mut idx = center.clone();
            idx[axis] = offset;
            impulse[idx.as_slice()] = F::from_f64_c(LAPLACIAN_NEIGHBOUR);
        }
    }
    impulse[center.as_slice()] = F::from_f64_c(LAPLACIAN_CENTER_PER_AXIS * ndim as f64);

    let transfer = ir2tf(&impulse, shape, is_real)?;
    Ok(Laplacian { impulse, transfer })
}
