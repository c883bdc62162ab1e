#![allow(dead_code)]

use std::f64::consts::PI;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Smooth periodic test scene, values in roughly [0.25, 0.75].
pub fn smooth_scene(h: usize, w: usize) -> Array2<f64> {
    Array2::from_shape_fn((h, w), |(r, c)| {
        0.5 + 0.15 * (2.0 * PI * 2.0 * r as f64 / h as f64).sin()
            + 0.1 * (2.0 * PI * 3.0 * c as f64 / w as f64).cos()
    })
}

/// Positive scene that does not wrap: a tilted plane under a Gaussian bump.
pub fn sloped_scene(h: usize, w: usize) -> Array2<f64> {
    let (cy, cx) = (h as f64 / 3.0, w as f64 / 2.0);
    let spread = 2.0 * (h as f64 / 6.0).powi(2);
    Array2::from_shape_fn((h, w), |(r, c)| {
        let (y, x) = (r as f64, c as f64);
        let bump = (-((y - cy).powi(2) + (x - cx).powi(2)) / spread).exp();
        0.4 + 0.1 * y / h as f64 + 0.05 * x / w as f64 + 0.2 * bump
    })
}

/// Two bright rectangles on a dim background.
pub fn blocky_scene(h: usize, w: usize) -> Array2<f64> {
    Array2::from_shape_fn((h, w), |(r, c)| {
        let in_a = (h / 4..h / 2).contains(&r) && (w / 4..w / 2).contains(&c);
        let in_b = (h / 2 + 4..3 * h / 4 + 4).contains(&r) && (w / 2..3 * w / 4).contains(&c);
        if in_a || in_b {
            0.8
        } else {
            0.2
        }
    })
}

/// Normalized box kernel.
pub fn uniform_psf(size: usize) -> Array2<f64> {
    Array2::from_elem((size, size), 1.0 / (size * size) as f64)
}

/// Normalized Gaussian kernel, centered.
pub fn gaussian_psf(size: usize, sigma: f64) -> Array2<f64> {
    let half = (size / 2) as f64;
    let kernel = Array2::from_shape_fn((size, size), |(r, c)| {
        let y = r as f64 - half;
        let x = c as f64 - half;
        (-(x * x + y * y) / (2.0 * sigma * sigma)).exp()
    });
    let sum = kernel.sum();
    kernel / sum
}

/// Circular convolution with the kernel center at the origin, the forward
/// model of the Wiener routines.
pub fn blur_periodic(image: &Array2<f64>, psf: &Array2<f64>) -> Array2<f64> {
    let (h, w) = image.dim();
    let (kh, kw) = psf.dim();
    Array2::from_shape_fn((h, w), |(r, c)| {
        let mut sum = 0.0;
        for i in 0..kh {
            for j in 0..kw {
                let sr = (r as isize - (i as isize - (kh / 2) as isize)).rem_euclid(h as isize);
                let sc = (c as isize - (j as isize - (kw / 2) as isize)).rem_euclid(w as isize);
                sum += psf[[i, j]] * image[[sr as usize, sc as usize]];
            }
        }
        sum
    })
}

/// Zero-padded convolution cropped to the input ("same" mode), the forward
/// model of Richardson-Lucy.
pub fn blur_same(image: &Array2<f64>, psf: &Array2<f64>) -> Array2<f64> {
    let (h, w) = image.dim();
    let (kh, kw) = psf.dim();
    let (oy, ox) = ((kh - 1) / 2, (kw - 1) / 2);
    Array2::from_shape_fn((h, w), |(r, c)| {
        let mut sum = 0.0;
        for i in 0..kh {
            for j in 0..kw {
                let sr = r as isize + oy as isize - i as isize;
                let sc = c as isize + ox as isize - j as isize;
                if sr >= 0 && sc >= 0 && (sr as usize) < h && (sc as usize) < w {
                    sum += psf[[i, j]] * image[[sr as usize, sc as usize]];
                }
            }
        }
        sum
    })
}

/// Mirror an out-of-range index back into `0..n`, repeating the edge sample.
fn reflect_index(i: isize, n: usize) -> usize {
    let n = n as isize;
    let mut i = i;
    loop {
        if i < 0 {
            i = -i - 1;
        } else if i >= n {
            i = 2 * n - i - 1;
        } else {
            return i as usize;
        }
    }
}

/// Convolution with edges extended by reflection, so the blur does not wrap
/// around the image.
pub fn blur_reflect(image: &Array2<f64>, psf: &Array2<f64>) -> Array2<f64> {
    let (h, w) = image.dim();
    let (kh, kw) = psf.dim();
    Array2::from_shape_fn((h, w), |(r, c)| {
        let mut sum = 0.0;
        for i in 0..kh {
            for j in 0..kw {
                let sr = reflect_index(r as isize - (i as isize - (kh / 2) as isize), h);
                let sc = reflect_index(c as isize - (j as isize - (kw / 2) as isize), w);
                sum += psf[[i, j]] * image[[sr, sc]];
            }
        }
        sum
    })
}

/// Add seeded white Gaussian noise.
pub fn add_noise(image: &Array2<f64>, sigma: f64, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    image.mapv(|v| {
        let n: f64 = rng.sample(StandardNormal);
        v + sigma * n
    })
}

pub fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}

/// Median of `|restored - truth| / |truth|` over all pixels.
pub fn median_relative_error(restored: &Array2<f64>, truth: &Array2<f64>) -> f64 {
    let mut errors: Vec<f64> = restored
        .iter()
        .zip(truth.iter())
        .map(|(r, t)| (r - t).abs() / t.abs())
        .collect();
    median(&mut errors)
}

/// Mean absolute error over the region `margin` pixels away from every edge.
pub fn interior_mae(a: &Array2<f64>, b: &Array2<f64>, margin: usize) -> f64 {
    let (h, w) = a.dim();
    let mut sum = 0.0;
    let mut count = 0usize;
    for r in margin..h - margin {
        for c in margin..w - margin {
            sum += (a[[r, c]] - b[[r, c]]).abs();
            count += 1;
        }
    }
    sum / count as f64
}

pub fn max_abs_diff<'a>(
    a: impl IntoIterator<Item = &'a f64>,
    b: impl IntoIterator<Item = &'a f64>,
) -> f64 {
    a.into_iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
