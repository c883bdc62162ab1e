//! Float abstraction shared by every restoration routine.
//!
//! The deconvolution functions are generic over `f32` and `f64` so the
//! caller's precision is carried end to end: an `f32` image is transformed,
//! filtered and returned in `f32`.

use std::fmt::{Debug, Display};
use std::iter::Sum;

use num_traits::{Float, FromPrimitive, NumAssign};
use rustfft::FftNum;

/// Floating point element type accepted by the restoration routines.
pub trait Real:
    Float + FftNum + FromPrimitive + NumAssign + Sum + Debug + Display + Send + Sync + 'static
{
    /// Convert an `f64` constant into this precision.
    fn from_f64_c(val: f64) -> Self;

    /// Convert a count into this precision.
    fn usize_as(val: usize) -> Self;

    /// Widen to `f64` for hyperparameter bookkeeping.
    fn to_f64_c(self) -> f64;
}

impl Real for f32 {
    #[inline]
    fn from_f64_c(val: f64) -> Self {
        val as f32
    }

    #[inline]
    fn usize_as(val: usize) -> Self {
        val as f32
    }

    #[inline]
    fn to_f64_c(self) -> f64 {
        self as f64
    }
}

impl Real for f64 {
    #[inline]
    fn from_f64_c(val: f64) -> Self {
        val
    }

    #[inline]
    fn usize_as(val: usize) -> Self {
        val as f64
    }

    #[inline]
    fn to_f64_c(self) -> f64 {
        self
    }
}
