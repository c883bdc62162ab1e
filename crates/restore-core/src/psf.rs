use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_PSF_SIZE;
use crate::error::{RestoreError, Result};
use crate::float::Real;

/// Point-spread function model. Kernels are square, odd-sized and centered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum PsfModel {
    /// Box blur: every tap equal.
    Uniform { size: usize },
    /// Sampled Gaussian with standard deviation `sigma` pixels.
    Gaussian { sigma: f64, size: usize },
    /// Airy disk, `radius` = first dark ring radius in pixels.
    Airy { radius: f64, size: usize },
}

impl Default for PsfModel {
    fn default() -> Self {
        PsfModel::Uniform {
            size: DEFAULT_PSF_SIZE,
        }
    }
}

impl fmt::Display for PsfModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PsfModel::Uniform { size } => write!(f, "Uniform {size}x{size}"),
            PsfModel::Gaussian { sigma, size } => {
                write!(f, "Gaussian (sigma={sigma}, {size}x{size})")
            }
            PsfModel::Airy { radius, size } => {
                write!(f, "Airy (radius={radius}, {size}x{size})")
            }
        }
    }
}

impl PsfModel {
    pub fn size(&self) -> usize {
        match self {
            PsfModel::Uniform { size }
            | PsfModel::Gaussian { size, .. }
            | PsfModel::Airy { size, .. } => *size,
        }
    }
}

/// Build the kernel described by `model`, normalized to sum 1.
pub fn generate_psf<F: Real>(model: &PsfModel) -> Result<Array2<F>> {
    let size = model.size();
    if size == 0 || size % 2 == 0 {
        return Err(RestoreError::InvalidParameter(format!(
            "PSF size must be odd and positive, got {size}"
        )));
    }

    let kernel = match model {
        PsfModel::Uniform { size } => Array2::<f64>::ones((*size, *size)),
        PsfModel::Gaussian { sigma, size } => {
            if !(*sigma > 0.0) {
                return Err(RestoreError::InvalidParameter(format!(
                    "Gaussian sigma must be positive, got {sigma}"
                )));
            }
            gaussian_kernel(*sigma, *size)
        }
        PsfModel::Airy { radius, size } => {
            if !(*radius > 0.0) {
                return Err(RestoreError::InvalidParameter(format!(
                    "Airy radius must be positive, got {radius}"
                )));
            }
            airy_kernel(*radius, *size)
        }
    };

    let sum: f64 = kernel.sum();
    Ok(kernel.mapv(|v| F::from_f64_c(v / sum)))
}

/// Signed offset of `index` from the kernel center.
fn centered(index: usize, size: usize) -> f64 {
    index as f64 - (size / 2) as f64
}

fn gaussian_kernel(sigma: f64, size: usize) -> Array2<f64> {
    let sigma2 = 2.0 * sigma * sigma;
    Array2::from_shape_fn((size, size), |(row, col)| {
        let y = centered(row, size);
        let x = centered(col, size);
        (-(x * x + y * y) / sigma2).exp()
    })
}

/// `(2 * J1(pi*r/R) / (pi*r/R))^2`
fn airy_kernel(radius: f64, size: usize) -> Array2<f64> {
    Array2::from_shape_fn((size, size), |(row, col)| {
        let y = centered(row, size);
        let x = centered(col, size);
        let r = (x * x + y * y).sqrt();
        if r < 1e-12 {
            1.0 // lim (2*J1(x)/x)^2 as x→0 = 1
        } else {
            let arg = std::f64::consts::PI * r / radius;
            let jinc = 2.0 * bessel_j1(arg) / arg;
            jinc * jinc
        }
    })
}

// ---------------------------------------------------------------------------
// Bessel J1, Abramowitz & Stegun rational polynomial approximation
// ---------------------------------------------------------------------------

pub fn bessel_j1(x: f64) -> f64 {
    let ax = x.abs();

    if ax < 8.0 {
        let y = x * x;
        let r1 = x
            * (72362614232.0
                + y * (-7895059235.0
                    + y * (242396853.1
                        + y * (-2972611.439 + y * (15704.48260 + y * (-30.16036606))))));
        let r2 = 144725228442.0
            + y * (2300535178.0 + y * (18583304.74 + y * (99447.43394 + y * (376.9991397 + y))));
        r1 / r2
    } else {
        let z = 8.0 / ax;
        let y = z * z;
        let xx = ax - 2.356194491; // ax - 3*PI/4
        let p0 = 1.0
            + y * (0.183105e-2
                + y * (-0.3516396496e-4 + y * (0.2457520174e-5 + y * (-0.240337019e-6))));
        let q0 = 0.04687499995
            + y * (-0.2002690873e-3
                + y * (0.8449199096e-5 + y * (-0.88228987e-6 + y * (0.105787412e-6))));
        let ans = (0.636619772 / ax).sqrt() * (xx.cos() * p0 - z * xx.sin() * q0);
        if x < 0.0 {
            -ans
        } else {
            ans
        }
    }
}
