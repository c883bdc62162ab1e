use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Dimension mismatch: expected {expected} axes, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("FFT error: {0}")]
    Fft(String),

    #[error("Sampling error: {0}")]
    Sampling(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

pub type Result<T> = std::result::Result<T, RestoreError>;
