use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use restore_core::io::image_io::load_image;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image file (TIFF or PNG)
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let frame = load_image(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let data = &frame.data;
    let min = data.iter().copied().fold(f32::INFINITY, f32::min);
    let max = data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mean = data.iter().map(|&v| v as f64).sum::<f64>() / data.len().max(1) as f64;

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}x{}", frame.width(), frame.height());
    println!("Bit depth:   {}", frame.original_bit_depth);
    println!("Range:       {:.4} .. {:.4}", min, max);
    println!("Mean:        {:.4}", mean);

    Ok(())
}
