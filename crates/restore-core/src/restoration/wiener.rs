use ndarray::{Array, ArrayBase, Data, Dimension, Zip};
use tracing::debug;

use crate::error::Result;
use crate::float::Real;

use super::{forward, inverse, resolve_operators, Blur, Regularizer};

/// Wiener-Hunt deconvolution with a fixed regularization strength.
///
/// The restored spectrum is `H* / (|H|^2 + balance * |R|^2) * Y`, where `H` is
/// the transfer function of `blur`, `R` the regularizer (discrete Laplacian
/// when `reg` is `None`) and `Y` the unitary spectrum of `image`.
///
/// With `is_real` the half-spectrum path is used and any precomputed OTF or
/// regularizer transfer function must be on the half-spectrum grid; otherwise
/// both live on the full grid and the real part of the inverse is returned.
///
/// A `balance` of zero is a plain inverse filter: bins where `H == 0` yield
/// non-finite values, which are passed through.
pub fn wiener<F, S, D>(
    image: &ArrayBase<S, D>,
    blur: &Blur<F>,
    balance: F,
    reg: Option<&Regularizer<F>>,
    is_real: bool,
) -> Result<Array<F, D>>
where
    F: Real,
    S: Data<Elem = F>,
    D: Dimension,
{
    let shape = image.shape().to_vec();
    debug!(shape = ?shape, balance = %balance, is_real, "Wiener deconvolution");

    let (trans, reg) = resolve_operators(&shape, blur, reg, is_real)?;

    let filter = Zip::from(&trans)
        .and(&reg)
        .map_collect(|h, r| h.conj() / (h.norm_sqr() + balance * r.norm_sqr()));

    let mut spectrum = forward(&image.to_owned().into_dyn(), is_real)?;
    spectrum.zip_mut_with(&filter, |y, f| *y = *y * *f);

    let restored = inverse(&spectrum, &shape, is_real)?;
    Ok(restored.into_dimensionality::<D>()?)
}
