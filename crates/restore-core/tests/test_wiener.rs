mod common;

use ndarray::{Array2, Array3};

use restore_core::error::RestoreError;
use restore_core::restoration::uft::{ir2tf, laplacian, laplacian_with};
use restore_core::restoration::{wiener, Blur, Regularizer};

use common::{
    add_noise, blur_periodic, blur_reflect, gaussian_psf, max_abs_diff, median_relative_error,
    sloped_scene, smooth_scene, uniform_psf,
};

#[test]
fn test_wiener_preserves_shape() {
    for (h, w) in [(45, 45), (37, 52), (16, 9)] {
        let image = smooth_scene(h, w);
        let out = wiener(&image, &Blur::psf(&uniform_psf(5)), 0.05, None, true).unwrap();
        assert_eq!(out.dim(), (h, w));
        assert!(out.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn test_wiener_3d_volume() {
    let volume = Array3::from_shape_fn((6, 8, 10), |(z, y, x)| 0.5 + 0.01 * (z + y + x) as f64);
    let psf = Array3::from_elem((3, 3, 3), 1.0 / 27.0);
    let out = wiener(&volume, &Blur::psf(&psf), 0.1, None, true).unwrap();
    assert_eq!(out.dim(), (6, 8, 10));
}

#[test]
fn test_wiener_single_precision_tracks_double() {
    let image = add_noise(&blur_periodic(&smooth_scene(32, 32), &uniform_psf(5)), 0.01, 3);
    let psf = uniform_psf(5);
    let double = wiener(&image, &Blur::psf(&psf), 0.05, None, true).unwrap();
    let single = wiener(
        &image.mapv(|v| v as f32),
        &Blur::psf(&psf.mapv(|v| v as f32)),
        0.05f32,
        None,
        true,
    )
    .unwrap();
    let single = single.mapv(f64::from);
    assert!(max_abs_diff(&single, &double) < 1e-4);
}

#[test]
fn test_wiener_real_and_complex_paths_agree() {
    let (h, w) = (24, 30);
    let image = add_noise(&blur_periodic(&smooth_scene(h, w), &uniform_psf(5)), 0.01, 11);
    let psf = uniform_psf(5);

    let real = wiener(&image, &Blur::psf(&psf), 0.05, None, true).unwrap();

    let lap = laplacian::<f64>(2, &[h, w]).unwrap();
    let otf = ir2tf(&psf.clone().into_dyn(), &[h, w], false).unwrap();
    let complex = wiener(
        &image,
        &Blur::otf(otf),
        0.05,
        Some(&Regularizer::Impulse(lap.impulse)),
        false,
    )
    .unwrap();

    assert!(max_abs_diff(&real, &complex) < 1e-10);
}

#[test]
fn test_wiener_accepts_precomputed_transfer_functions() {
    let (h, w) = (20, 20);
    let image = smooth_scene(h, w);
    let psf = uniform_psf(3);
    let from_psf = wiener(&image, &Blur::psf(&psf), 0.1, None, true).unwrap();

    let otf = ir2tf(&psf.into_dyn(), &[h, w], true).unwrap();
    let reg = laplacian_with::<f64>(2, &[h, w], true).unwrap().transfer;
    let from_tf = wiener(
        &image,
        &Blur::otf(otf),
        0.1,
        Some(&Regularizer::Transfer(reg)),
        true,
    )
    .unwrap();
    assert!(max_abs_diff(&from_psf, &from_tf) < 1e-12);
}

#[test]
fn test_wiener_flat_image_is_unchanged() {
    // Laplacian vanishes at DC and the PSF sums to one
    let image = Array2::from_elem((17, 23), 0.4f64);
    let out = wiener(&image, &Blur::psf(&uniform_psf(5)), 1.0, None, true).unwrap();
    for v in out.iter() {
        assert!((v - 0.4).abs() < 1e-10);
    }
}

#[test]
fn test_wiener_does_not_mutate_inputs() {
    let image = smooth_scene(12, 12);
    let psf = uniform_psf(3);
    let (image_before, psf_before) = (image.clone(), psf.clone());
    let _ = wiener(&image, &Blur::psf(&psf), 0.05, None, true).unwrap();
    assert_eq!(image, image_before);
    assert_eq!(psf, psf_before);
}

#[test]
fn test_wiener_restores_blurred_scene() {
    let truth = smooth_scene(45, 45);
    let psf = gaussian_psf(5, 1.0);
    let observed = add_noise(&blur_periodic(&truth, &psf), 0.005, 42);
    let restored = wiener(&observed, &Blur::psf(&psf), 0.01, None, true).unwrap();
    let err = median_relative_error(&restored, &truth);
    assert!(err < 0.1, "median relative error {err}");
}

#[test]
fn test_wiener_restores_scene_blurred_with_reflected_edges() {
    let psf = gaussian_psf(5, 1.0);
    for size in [100, 45] {
        let truth = sloped_scene(size, size);
        let observed = blur_reflect(&truth, &psf);
        let restored = wiener(&observed, &Blur::psf(&psf), 1.0, None, true).unwrap();
        assert_eq!(restored.dim(), (size, size));
        let err = median_relative_error(&restored, &truth);
        assert!(err < 0.1, "{size}x{size}: median relative error {err}");
    }
}

#[test]
fn test_wiener_rejects_misshaped_transfer_function() {
    let image = smooth_scene(16, 16);
    let otf = ir2tf(&uniform_psf(3).into_dyn(), &[16, 16], false).unwrap();
    // full-grid OTF on the half-spectrum path
    let result = wiener(&image, &Blur::otf(otf), 0.05, None, true);
    assert!(matches!(result, Err(RestoreError::ShapeMismatch { .. })));
}

#[test]
fn test_wiener_rejects_psf_rank_mismatch() {
    let image = smooth_scene(16, 16);
    let psf = Array3::from_elem((3, 3, 3), 1.0 / 27.0);
    let result = wiener(&image, &Blur::psf(&psf), 0.05, None, true);
    assert!(matches!(result, Err(RestoreError::DimensionMismatch { .. })));
}
