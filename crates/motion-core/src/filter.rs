//! The per-slit filtering capability shared by both filter branches.

use std::time::Instant;

use rayon::prelude::*;
use stfilter_common::StfilterResult;

use crate::normalize::{normalize_to_u8, Normalized};
use crate::plane::Plane;
use crate::reslice::SliceStack;

/// A filter that maps each slit image to a float response, which is then
/// normalized per slit to 0–255.
///
/// Implementors provide `response`; `apply` runs it over a whole stack in
/// parallel. Output slit `i` always corresponds to input slit `i`.
pub trait SlitFilter: Send + Sync {
    /// Filter name for logs.
    fn name(&self) -> &str;

    /// Reject stacks this filter cannot process. Runs before any filtering.
    fn validate(&self, _stack: &SliceStack) -> StfilterResult<()> {
        Ok(())
    }

    /// Unnormalized response for one slit image.
    fn response(&self, slit: &Plane<u8>) -> Plane<f32>;

    /// Validate, filter every slit, normalize and quantize.
    fn apply(&self, stack: &SliceStack) -> StfilterResult<SliceStack> {
        self.validate(stack)?;

        let started = Instant::now();
        let normalized: Vec<Normalized> = stack
            .slits()
            .par_iter()
            .map(|slit| normalize_to_u8(&self.response(slit)))
            .collect();

        let degenerate = normalized.iter().filter(|n| n.degenerate).count();
        if degenerate > 0 {
            tracing::debug!(
                filter = self.name(),
                degenerate,
                "Slits without dynamic range mapped to constant output"
            );
        }
        tracing::debug!(
            filter = self.name(),
            axis = %stack.axis(),
            slits = stack.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Filtered slice stack"
        );

        SliceStack::new(
            stack.axis(),
            normalized.into_iter().map(|n| n.plane).collect(),
        )
    }
}
