//! Dense and separable 2-D filtering on planes.
//!
//! Both filters compute a correlation with the kernel anchored at its
//! centre (`(kw / 2, kh / 2)`), accumulate in f32 and never clamp. Callers
//! that want true convolution flip the kernel first (see
//! [`Kernel::flip_horizontal`]).
//!
//! BORDER HANDLING: reflect-101 (`gfedcb|abcdefgh|gfedcba`). The edge
//! sample is not repeated, and reflection repeats until the index lands
//! inside the plane, so kernels wider than the plane still have a defined
//! response.

use crate::plane::{Plane, Sample};

/// A dense 2-D kernel of f32 coefficients, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl Kernel {
    /// # Panics
    /// Panics if the kernel is empty or `data.len() != width * height`.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Self {
        assert!(width > 0 && height > 0, "kernel must be non-empty");
        assert_eq!(data.len(), width * height, "kernel data does not match {width}x{height}");
        Self {
            data,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mirror around the vertical axis: column `x` becomes `width - 1 - x`.
    pub fn flip_horizontal(&self) -> Self {
        let data = self
            .data
            .chunks_exact(self.width)
            .flat_map(|row| row.iter().rev().copied())
            .collect();
        Self::new(self.width, self.height, data)
    }

    /// Whether the kernel fits inside a `rows × cols` plane.
    pub fn fits_within(&self, rows: usize, cols: usize) -> bool {
        self.width <= cols && self.height <= rows
    }
}

/// Map an out-of-range coordinate back into `[0, len)` by reflect-101.
#[inline]
pub fn reflect_101(p: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let mut p = p;
    while p < 0 || p >= len {
        if p < 0 {
            p = -p;
        } else {
            p = 2 * len - 2 - p;
        }
    }
    p as usize
}

/// Precomputed source indices for every output position and tap.
///
/// `offsets[i * taps + k]` is the source index read by output `i` at tap `k`.
fn tap_offsets(len: usize, taps: usize) -> Vec<usize> {
    let anchor = (taps / 2) as isize;
    let mut offsets = Vec::with_capacity(len * taps);
    for i in 0..len as isize {
        for k in 0..taps as isize {
            offsets.push(reflect_101(i + k - anchor, len));
        }
    }
    offsets
}

/// Correlate `src` with a dense kernel.
pub fn filter2d<T: Sample>(src: &Plane<T>, kernel: &Kernel) -> Plane<f32> {
    let (w, h) = (src.width(), src.height());
    let (kw, kh) = (kernel.width(), kernel.height());
    let xs = tap_offsets(w, kw);
    let ys = tap_offsets(h, kh);

    let mut data = Vec::with_capacity(w * h);
    for y in 0..h {
        let row_taps = &ys[y * kh..(y + 1) * kh];
        for x in 0..w {
            let col_taps = &xs[x * kw..(x + 1) * kw];
            let mut acc = 0.0f32;
            for (ky, &sy) in row_taps.iter().enumerate() {
                let src_row = src.row(sy);
                for (kx, &sx) in col_taps.iter().enumerate() {
                    acc += src_row[sx].to_f32() * kernel.at(kx, ky);
                }
            }
            data.push(acc);
        }
    }
    Plane::from_parts(w, h, data)
}

/// Correlate every row of `src` with `kernel` (horizontal pass).
pub fn filter_rows<T: Sample>(src: &Plane<T>, kernel: &[f32]) -> Plane<f32> {
    assert!(!kernel.is_empty(), "kernel must not be empty");
    let (w, h) = (src.width(), src.height());
    let taps = kernel.len();
    let xs = tap_offsets(w, taps);

    let mut data = Vec::with_capacity(w * h);
    for row in src.rows() {
        for x in 0..w {
            let acc = xs[x * taps..(x + 1) * taps]
                .iter()
                .zip(kernel)
                .fold(0.0f32, |acc, (&sx, &kv)| acc + row[sx].to_f32() * kv);
            data.push(acc);
        }
    }
    Plane::from_parts(w, h, data)
}

/// Correlate every column of `src` with `kernel` (vertical pass).
pub fn filter_cols(src: &Plane<f32>, kernel: &[f32]) -> Plane<f32> {
    assert!(!kernel.is_empty(), "kernel must not be empty");
    let (w, h) = (src.width(), src.height());
    let taps = kernel.len();
    let ys = tap_offsets(h, taps);

    let mut data = vec![0.0f32; w * h];
    for y in 0..h {
        let dst = &mut data[y * w..(y + 1) * w];
        for (&sy, &kv) in ys[y * taps..(y + 1) * taps].iter().zip(kernel) {
            for (d, &s) in dst.iter_mut().zip(src.row(sy)) {
                *d += s * kv;
            }
        }
    }
    Plane::from_parts(w, h, data)
}

/// Separable 2-D correlation: `kernel_x` along rows, then `kernel_y` along columns.
pub fn sep_filter2d<T: Sample>(src: &Plane<T>, kernel_x: &[f32], kernel_y: &[f32]) -> Plane<f32> {
    let intermediate = filter_rows(src, kernel_x);
    filter_cols(&intermediate, kernel_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_101_in_range_is_identity() {
        for p in 0..5 {
            assert_eq!(reflect_101(p, 5), p as usize);
        }
    }

    #[test]
    fn test_reflect_101_borders() {
        // gfedcb|abcdefgh|gfedcba
        assert_eq!(reflect_101(-1, 8), 1);
        assert_eq!(reflect_101(-3, 8), 3);
        assert_eq!(reflect_101(8, 8), 6);
        assert_eq!(reflect_101(10, 8), 4);
    }

    #[test]
    fn test_reflect_101_repeats_for_short_axes() {
        // len 3: indices cycle 0 1 2 1 0 1 2 ...
        assert_eq!(reflect_101(-4, 3), 0);
        assert_eq!(reflect_101(5, 3), 1);
        assert_eq!(reflect_101(6, 3), 2);
        assert_eq!(reflect_101(-7, 1), 0);
    }

    #[test]
    fn test_identity_kernel_copies_source() {
        let mut k = vec![0.0f32; 9];
        k[4] = 1.0;
        let kernel = Kernel::new(3, 3, k);
        let src = Plane::from_vec(4, 3, (0u8..12).collect()).unwrap();
        let out = filter2d(&src, &kernel);
        for (a, b) in out.as_slice().iter().zip(src.as_slice()) {
            assert_eq!(*a, *b as f32);
        }
    }

    #[test]
    fn test_filter2d_is_correlation() {
        // Kernel picks the right-hand neighbour.
        let kernel = Kernel::new(3, 1, vec![0.0, 0.0, 1.0]);
        let src = Plane::from_vec(4, 1, vec![1u8, 2, 3, 4]).unwrap();
        let out = filter2d(&src, &kernel);
        // Last sample reflects back to index 2.
        assert_eq!(out.as_slice(), &[2.0, 3.0, 4.0, 3.0]);
    }

    #[test]
    fn test_flip_horizontal() {
        let kernel = Kernel::new(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let flipped = kernel.flip_horizontal();
        assert_eq!(flipped.as_slice(), &[3.0, 2.0, 1.0, 6.0, 5.0, 4.0]);
        assert_eq!(flipped.flip_horizontal(), kernel);
    }

    #[test]
    fn test_separable_matches_dense_outer_product() {
        let kx = [0.25f32, 0.5, 0.25];
        let ky = [-1.0f32, 0.0, 1.0];
        let dense: Vec<f32> = ky.iter().flat_map(|&a| kx.iter().map(move |&b| a * b)).collect();
        let kernel = Kernel::new(3, 3, dense);
        let src = Plane::from_vec(5, 4, (0u8..20).map(|v| v * 7).collect()).unwrap();

        let sep = sep_filter2d(&src, &kx, &ky);
        let full = filter2d(&src, &kernel);
        for (a, b) in sep.as_slice().iter().zip(full.as_slice()) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn test_constant_plane_stays_uniform() {
        let src = Plane::filled(4, 4, 128u8);
        let kx = [0.1f32, 0.2, 0.3, 0.2, 0.1];
        let out = sep_filter2d(&src, &kx, &kx);
        let first = out.as_slice()[0];
        assert!(out.as_slice().iter().all(|&v| v == first));
    }

    #[test]
    fn test_kernel_fits_within() {
        let kernel = Kernel::new(9, 9, vec![0.0; 81]);
        assert!(kernel.fits_within(9, 9));
        assert!(!kernel.fits_within(8, 20));
        assert!(!kernel.fits_within(20, 8));
    }
}
