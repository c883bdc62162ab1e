use ndarray::Array2;

/// Grayscale image as read from disk, values nominally in `[0, 1]`.
///
/// Restored frames may leave that range until they are written; the writers
/// clamp.
#[derive(Clone, Debug)]
pub struct Frame {
    /// `(height, width)`
    pub data: Array2<f32>,
    /// Sample depth of the file the frame came from (8 or 16).
    pub original_bit_depth: u8,
}

impl Frame {
    pub fn new(data: Array2<f32>, original_bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth,
        }
    }

    /// A frame with new pixels and this frame's source depth.
    pub fn with_data(&self, data: Array2<f32>) -> Self {
        Self::new(data, self.original_bit_depth)
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}
