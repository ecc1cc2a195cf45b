//! Gabor energy: phase-robust magnitude of an oriented kernel bank.

use stfilter_common::{StfilterError, StfilterResult};

use crate::convolve::filter2d;
use crate::filter::SlitFilter;
use crate::kernel::{build_kernel_bank, KernelBank, DEFAULT_ORIENTATIONS};
use crate::plane::Plane;
use crate::reslice::SliceStack;

/// Per slit: `sqrt(Σ_k (slit ⊛ k)²)` over the bank, normalized to 0–255.
#[derive(Debug, Clone)]
pub struct GaborEnergyFilter {
    bank: KernelBank,
}

impl GaborEnergyFilter {
    pub fn new(bank: KernelBank) -> Self {
        Self { bank }
    }

    /// Two-orientation bank at π/4 and 3π/4.
    pub fn with_defaults() -> Self {
        Self::new(build_kernel_bank(&DEFAULT_ORIENTATIONS))
    }

    pub fn bank(&self) -> &KernelBank {
        &self.bank
    }

    /// Energy before normalization. Every sample is `>= 0`.
    pub fn energy(&self, slit: &Plane<u8>) -> Plane<f32> {
        let mut sum_sq = vec![0.0f32; slit.width() * slit.height()];
        for kernel in self.bank.kernels() {
            let response = filter2d(slit, kernel);
            for (acc, &r) in sum_sq.iter_mut().zip(response.as_slice()) {
                *acc += r * r;
            }
        }
        let energy = sum_sq.into_iter().map(f32::sqrt).collect();
        Plane::from_parts(slit.width(), slit.height(), energy)
    }
}

impl SlitFilter for GaborEnergyFilter {
    fn name(&self) -> &str {
        "gabor-energy"
    }

    fn validate(&self, stack: &SliceStack) -> StfilterResult<()> {
        let Some((kh, kw)) = self.bank.max_extent() else {
            return Err(StfilterError::validation("Gabor kernel bank is empty"));
        };
        let (rows, cols) = stack.slit_shape();
        if let Some(kernel) = self
            .bank
            .kernels()
            .iter()
            .find(|k| !k.fits_within(rows, cols))
        {
            return Err(StfilterError::validation(format!(
                "{}x{} Gabor kernel exceeds {rows}x{cols} slit images (largest kernel {kh}x{kw})",
                kernel.height(),
                kernel.width(),
            )));
        }
        Ok(())
    }

    fn response(&self, slit: &Plane<u8>) -> Plane<f32> {
        self.energy(slit)
    }
}

/// One normalized energy map per slit of `stack`, in the same order.
pub fn compute_energy(stack: &SliceStack, bank: &KernelBank) -> StfilterResult<SliceStack> {
    GaborEnergyFilter::new(bank.clone()).apply(stack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reslice::Axis;

    fn noise_slit(width: usize, height: usize, seed: u32) -> Plane<u8> {
        let mut state = seed.wrapping_mul(2_654_435_761).max(1);
        let data = (0..width * height)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect();
        Plane::from_vec(width, height, data).unwrap()
    }

    #[test]
    fn energy_is_non_negative() {
        let filter = GaborEnergyFilter::with_defaults();
        let energy = filter.energy(&noise_slit(16, 12, 7));
        assert!(energy.as_slice().iter().all(|&v| v >= 0.0));
        assert!(energy.as_slice().iter().any(|&v| v > 0.0));
    }

    #[test]
    fn single_kernel_energy_is_absolute_response() {
        let bank = build_kernel_bank(&[DEFAULT_ORIENTATIONS[0]]);
        let filter = GaborEnergyFilter::new(bank.clone());
        let slit = noise_slit(10, 9, 3);
        let energy = filter.energy(&slit);
        let response = filter2d(&slit, &bank.kernels()[0]);
        for (e, r) in energy.as_slice().iter().zip(response.as_slice()) {
            assert!((e - r.abs()).abs() <= 1e-3 * r.abs().max(1.0));
        }
    }

    #[test]
    fn compute_energy_preserves_order_and_shape() {
        let slits: Vec<_> = (0..6).map(|i| noise_slit(12, 10, i + 1)).collect();
        let stack = SliceStack::new(Axis::Y, slits.clone()).unwrap();
        let bank = build_kernel_bank(&DEFAULT_ORIENTATIONS);
        let out = compute_energy(&stack, &bank).unwrap();

        assert_eq!(out.len(), 6);
        assert_eq!(out.axis(), Axis::Y);
        assert_eq!(out.slit_shape(), (10, 12));
        let filter = GaborEnergyFilter::new(bank);
        for (i, slit) in slits.iter().enumerate() {
            let expected = crate::normalize::normalize_to_u8(&filter.energy(slit)).plane;
            assert_eq!(out.slit(i).unwrap(), &expected, "slit {i}");
        }
    }

    #[test]
    fn empty_bank_is_rejected() {
        let stack = SliceStack::new(Axis::Y, vec![noise_slit(12, 12, 1)]).unwrap();
        let err = compute_energy(&stack, &build_kernel_bank(&[])).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn kernel_larger_than_slit_is_rejected() {
        // 3 time samples is shorter than the 9-tap kernel height.
        let stack = SliceStack::new(Axis::Y, vec![Plane::filled(20, 3, 128u8)]).unwrap();
        let err = GaborEnergyFilter::with_defaults().apply(&stack).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn constant_slit_yields_constant_fallback() {
        let stack = SliceStack::new(Axis::X, vec![Plane::filled(9, 9, 200u8)]).unwrap();
        let out = GaborEnergyFilter::with_defaults().apply(&stack).unwrap();
        assert!(out.slit(0).unwrap().as_slice().iter().all(|&v| v == 0));
    }
}
