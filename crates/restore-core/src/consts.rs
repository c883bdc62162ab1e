/// Minimum element count of an FFT pass to spread its lanes over Rayon.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Center weight per axis of the discrete Laplacian (total is `2 * ndim`).
pub const LAPLACIAN_CENTER_PER_AXIS: f64 = 2.0;

/// Neighbour weight of the discrete Laplacian along each axis.
pub const LAPLACIAN_NEIGHBOUR: f64 = -1.0;

/// Values outside `[-CLIP_LIMIT, CLIP_LIMIT]` are clipped when clipping is on.
pub const CLIP_LIMIT: f64 = 1.0;

/// Default Wiener regularization strength.
pub const DEFAULT_WIENER_BALANCE: f64 = 0.05;

/// Default Richardson-Lucy iteration count.
pub const DEFAULT_RL_ITERATIONS: usize = 30;

/// Convergence threshold on the relative change of the Gibbs posterior mean.
pub const DEFAULT_GIBBS_THRESHOLD: f64 = 1e-4;

/// Iterations discarded before the posterior mean is accumulated.
pub const DEFAULT_GIBBS_BURNIN: usize = 15;

/// Iterations run before the convergence test is allowed to stop the chain.
pub const DEFAULT_GIBBS_MIN_ITER: usize = 30;

/// Hard cap on Gibbs iterations.
pub const DEFAULT_GIBBS_MAX_ITER: usize = 200;

/// Default side length of generated PSF kernels.
pub const DEFAULT_PSF_SIZE: usize = 5;
