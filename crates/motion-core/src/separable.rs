//! Fixed 9-tap separable spatiotemporal filter.

use crate::convolve::sep_filter2d;
use crate::filter::SlitFilter;
use crate::plane::Plane;

/// The two 9-tap coefficient vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapKernels {
    /// Applied along each slit row (the spatial axis).
    pub spatial: [f32; 9],
    /// Applied along each slit column (the time axis).
    pub temporal: [f32; 9],
}

impl TapKernels {
    pub const MOTION_ENERGY: TapKernels = TapKernels {
        spatial: [
            0.0094, 0.1148, 0.3964, -0.0601, -0.9213, -0.0601, 0.3964, 0.1148, 0.0094,
        ],
        temporal: [
            0.0008, 0.0176, 0.1660, 0.6383, 1.0, 0.6383, 0.1660, 0.0176, 0.0008,
        ],
    };
}

/// Squared separable response, normalized per slit.
#[derive(Debug, Clone, Default)]
pub struct SeparableTapFilter {
    kernels: TapKernels,
}

impl Default for TapKernels {
    fn default() -> Self {
        Self::MOTION_ENERGY
    }
}

impl SeparableTapFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kernels(&self) -> &TapKernels {
        &self.kernels
    }
}

impl SlitFilter for SeparableTapFilter {
    fn name(&self) -> &str {
        "9-tap"
    }

    fn response(&self, slit: &Plane<u8>) -> Plane<f32> {
        sep_filter2d(slit, &self.kernels.spatial, &self.kernels.temporal).map(|v| v * v)
    }
}
