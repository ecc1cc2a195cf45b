//! Min-max normalization of filter responses to 8-bit intensity.

use crate::plane::Plane;

/// Lower bound of the output range.
pub const OUT_MIN: f64 = 0.0;
/// Upper bound of the output range.
pub const OUT_MAX: f64 = 255.0;

/// Result of normalizing one response plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub plane: Plane<u8>,
    /// The input had no usable dynamic range and was mapped to the fallback.
    pub degenerate: bool,
}

/// Rescale `src` linearly so its own minimum maps to 0 and maximum to 255,
/// then quantize with round-half-to-even.
///
/// A plane with `max - min <= f64::EPSILON`, or with non-finite samples,
/// cannot be rescaled and becomes constant 0.
pub fn normalize_to_u8(src: &Plane<f32>) -> Normalized {
    let range = src
        .min_max()
        .filter(|_| src.as_slice().iter().all(|v| v.is_finite()))
        .map(|(lo, hi)| (lo as f64, hi as f64))
        .filter(|(lo, hi)| hi - lo > f64::EPSILON);

    let Some((lo, hi)) = range else {
        return Normalized {
            plane: Plane::new(src.width(), src.height()),
            degenerate: true,
        };
    };

    let scale = (OUT_MAX - OUT_MIN) / (hi - lo);
    let shift = OUT_MIN - lo * scale;
    Normalized {
        plane: src.map(|v| quantize(v as f64 * scale + shift)),
        degenerate: false,
    }
}

#[inline]
fn quantize(v: f64) -> u8 {
    v.round_ties_even().clamp(0.0, 255.0) as u8
}
