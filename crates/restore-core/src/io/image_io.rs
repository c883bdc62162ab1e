use std::path::Path;

use image::{ColorType, ImageBuffer, ImageFormat, Luma};
use ndarray::Array2;

use crate::error::{RestoreError, Result};
use crate::frame::Frame;

/// Map a nominal `[0, 1]` sample onto `0..=max`, clamping out-of-range values.
fn quantize(v: f32, max: f32) -> f32 {
    (v.clamp(0.0, 1.0) * max).round()
}

/// Write a 16-bit grayscale TIFF.
pub fn save_tiff(frame: &Frame, path: &Path) -> Result<()> {
    let (h, w) = frame.data.dim();
    let pixels: Vec<u16> = frame
        .data
        .iter()
        .map(|&v| quantize(v, u16::MAX as f32) as u16)
        .collect();
    let buffer = ImageBuffer::<Luma<u16>, _>::from_raw(w as u32, h as u32, pixels)
        .ok_or_else(|| RestoreError::Pipeline(format!("pixel buffer does not fit {w}x{h}")))?;
    buffer.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Write an 8-bit grayscale PNG.
pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let (h, w) = frame.data.dim();
    let buffer = ImageBuffer::from_fn(w as u32, h as u32, |x, y| {
        Luma([quantize(frame.data[[y as usize, x as usize]], u8::MAX as f32) as u8])
    });
    buffer.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Write `frame` as PNG for a `.png` path, 16-bit TIFF otherwise.
pub fn save_image(frame: &Frame, path: &Path) -> Result<()> {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    if is_png {
        save_png(frame, path)
    } else {
        save_tiff(frame, path)
    }
}

/// Read any format `image` decodes, converted to grayscale in `[0, 1]`.
pub fn load_image(path: &Path) -> Result<Frame> {
    let decoded = image::open(path)?;
    let bit_depth = match decoded.color() {
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8 => 8,
        _ => 16,
    };
    let luma = decoded.into_luma16();
    let (w, h) = luma.dimensions();
    let samples: Vec<f32> = luma
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / u16::MAX as f32)
        .collect();
    let data = Array2::from_shape_vec((h as usize, w as usize), samples)?;
    Ok(Frame::new(data, bit_depth))
}
