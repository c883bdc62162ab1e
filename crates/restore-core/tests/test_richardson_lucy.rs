mod common;

use ndarray::{Array1, Array2, Array3};

use restore_core::error::RestoreError;
use restore_core::restoration::richardson_lucy;

use common::{blocky_scene, blur_same, interior_mae, max_abs_diff, smooth_scene, uniform_psf};

#[test]
fn test_rl_preserves_shape() {
    for (h, w) in [(45, 45), (31, 50)] {
        let image = smooth_scene(h, w);
        let out = richardson_lucy(&image, &uniform_psf(5), 5, None).unwrap();
        assert_eq!(out.dim(), (h, w));
        assert!(out.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn test_rl_one_dimensional_signal() {
    let signal = Array1::from_shape_fn(40, |i| 0.3 + 0.02 * (i % 7) as f64);
    let psf = Array1::from_elem(5, 0.2);
    let out = richardson_lucy(&signal, &psf, 4, None).unwrap();
    assert_eq!(out.len(), 40);
}

#[test]
fn test_rl_zero_iterations_returns_observed() {
    let image = smooth_scene(20, 20);
    let out = richardson_lucy(&image, &uniform_psf(3), 0, None).unwrap();
    assert_eq!(out, image);
}

#[test]
fn test_rl_flat_interior_stays_flat() {
    let image = Array2::from_elem((64, 64), 0.5f64);
    let out = richardson_lucy(&image, &uniform_psf(5), 5, None).unwrap();
    // each iteration propagates edge effects by at most four pixels
    for r in 24..40 {
        for c in 24..40 {
            assert!((out[[r, c]] - 0.5).abs() < 1e-9, "({r}, {c}) = {}", out[[r, c]]);
        }
    }
}

#[test]
fn test_rl_sharpens_blurred_scene() {
    let truth = blocky_scene(64, 64);
    let psf = uniform_psf(5);
    let blurred = blur_same(&truth, &psf);
    let restored = richardson_lucy(&blurred, &psf, 20, None).unwrap();
    let before = interior_mae(&blurred, &truth, 8);
    let after = interior_mae(&restored, &truth, 8);
    assert!(after < before, "error grew: {before} -> {after}");
}

#[test]
fn test_rl_single_precision_tracks_double() {
    let image = blur_same(&blocky_scene(32, 32), &uniform_psf(3));
    let psf = uniform_psf(3);
    let double = richardson_lucy(&image, &psf, 5, None).unwrap();
    let single =
        richardson_lucy(&image.mapv(|v| v as f32), &psf.mapv(|v| v as f32), 5, None).unwrap();
    assert!(max_abs_diff(&single.mapv(f64::from), &double) < 1e-4);
}

#[test]
fn test_rl_filter_epsilon_guards_zero_regions() {
    let mut image = Array2::<f64>::zeros((24, 24));
    image.slice_mut(ndarray::s![8..16, 8..16]).fill(0.6);
    let out = richardson_lucy(&image, &uniform_psf(3), 5, Some(1e-6)).unwrap();
    assert!(out.iter().all(|v| v.is_finite()));
    assert_eq!(out[[0, 0]], 0.0);
}

#[test]
fn test_rl_zero_image_without_epsilon_is_not_finite() {
    let image = Array2::<f64>::zeros((16, 16));
    let out = richardson_lucy(&image, &uniform_psf(3), 1, None).unwrap();
    assert!(out.iter().any(|v| !v.is_finite()));

    let guarded = richardson_lucy(&image, &uniform_psf(3), 1, Some(1e-12)).unwrap();
    assert!(guarded.iter().all(|v| *v == 0.0));
}

#[test]
fn test_rl_rejects_rank_mismatch() {
    let image = smooth_scene(16, 16);
    let psf = Array3::from_elem((3, 3, 3), 1.0 / 27.0);
    let result = richardson_lucy(&image, &psf, 3, None);
    assert!(matches!(
        result,
        Err(RestoreError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));
}

#[test]
fn test_rl_rejects_nonpositive_epsilon() {
    let image = smooth_scene(8, 8);
    let result = richardson_lucy(&image, &uniform_psf(3), 3, Some(0.0));
    assert!(matches!(result, Err(RestoreError::InvalidParameter(_))));
}

#[test]
fn test_rl_rejects_empty_image() {
    let image = Array2::<f64>::zeros((0, 4));
    let psf = Array2::from_elem((1, 1), 1.0);
    let result = richardson_lucy(&image, &psf, 1, None);
    assert!(matches!(result, Err(RestoreError::InvalidParameter(_))));
}

#[test]
fn test_rl_psf_precision_can_differ_from_image() {
    let image = blur_same(&blocky_scene(24, 24), &uniform_psf(3)).mapv(|v| v as f32);
    let psf64 = uniform_psf(3);
    let psf32 = psf64.mapv(|v| v as f32);

    let from_double: Array2<f32> = richardson_lucy(&image, &psf64, 4, None).unwrap();
    let from_single: Array2<f32> = richardson_lucy(&image, &psf32, 4, None).unwrap();
    assert_eq!(from_double, from_single);

    let widened = richardson_lucy(&image.mapv(f64::from), &psf32, 4, None).unwrap();
    assert!(max_abs_diff(&from_single.mapv(f64::from), &widened) < 1e-4);
}
