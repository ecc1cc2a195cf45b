//! Oriented Gabor kernels and the immutable bank that holds them.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::convolve::Kernel;

/// Orientations used by the motion-energy pipeline: π/4 and 3π/4.
pub const DEFAULT_ORIENTATIONS: [f64; 2] = [FRAC_PI_4, 3.0 * FRAC_PI_4];

/// Fixed Gabor parameters shared by every kernel in a bank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaborParams {
    /// Kernel side length (odd).
    pub size: usize,
    /// Standard deviation of the Gaussian envelope.
    pub sigma: f64,
    /// Wavelength of the sinusoidal carrier.
    pub lambda: f64,
    /// Spatial aspect ratio.
    pub gamma: f64,
    /// Phase offset.
    pub psi: f64,
}

impl GaborParams {
    /// 9×9, sigma 1, lambda 1, gamma 2, psi π/2.
    pub const MOTION_ENERGY: GaborParams = GaborParams {
        size: 9,
        sigma: 1.0,
        lambda: 1.0,
        gamma: 2.0,
        psi: FRAC_PI_2,
    };
}

impl Default for GaborParams {
    fn default() -> Self {
        Self::MOTION_ENERGY
    }
}

/// Sample a Gabor kernel at orientation `theta` (radians).
///
/// Coefficients are evaluated in f64 and stored as f32. Sample `(x, y)`
/// relative to the centre is written at `(xmax - x, ymax - y)`, the
/// classic point-reflected layout.
pub fn gabor_kernel(theta: f64, params: &GaborParams) -> Kernel {
    let half = (params.size / 2) as i64;
    let side = (2 * half + 1) as usize;
    let sigma_x = params.sigma;
    let sigma_y = params.sigma / params.gamma;
    let ex = -0.5 / (sigma_x * sigma_x);
    let ey = -0.5 / (sigma_y * sigma_y);
    let carrier = 2.0 * PI / params.lambda;
    let (s, c) = theta.sin_cos();

    let mut data = vec![0.0f32; side * side];
    for y in -half..=half {
        for x in -half..=half {
            let xr = x as f64 * c + y as f64 * s;
            let yr = -(x as f64) * s + y as f64 * c;
            let v = (ex * xr * xr + ey * yr * yr).exp() * (carrier * xr + params.psi).cos();
            let row = (half - y) as usize;
            let col = (half - x) as usize;
            data[row * side + col] = v as f32;
        }
    }
    Kernel::new(side, side, data)
}

/// Ordered, immutable set of kernels, one per orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelBank {
    orientations: Vec<f64>,
    kernels: Vec<Kernel>,
}

impl KernelBank {
    pub fn orientations(&self) -> &[f64] {
        &self.orientations
    }

    pub fn kernels(&self) -> &[Kernel] {
        &self.kernels
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Largest `(height, width)` over all kernels, `None` for an empty bank.
    pub fn max_extent(&self) -> Option<(usize, usize)> {
        self.kernels.iter().fold(None, |acc, k| {
            let (h, w) = acc.unwrap_or((0, 0));
            Some((h.max(k.height()), w.max(k.width())))
        })
    }
}

/// Build the motion-energy Gabor bank for the given orientations.
///
/// Each kernel is flipped horizontally after generation so that the
/// correlation in [`crate::convolve::filter2d`] applies it as a convolution.
/// An empty orientation list yields an empty bank; filtering with it is
/// rejected.
pub fn build_kernel_bank(orientations: &[f64]) -> KernelBank {
    let params = GaborParams::MOTION_ENERGY;
    let kernels = orientations
        .iter()
        .map(|&theta| gabor_kernel(theta, &params).flip_horizontal())
        .collect();
    KernelBank {
        orientations: orientations.to_vec(),
        kernels,
    }
}
