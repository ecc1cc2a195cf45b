//! End-to-end motion-energy pipeline.
//!
//! ```text
//! frames ─► FrameVolume ─┬─► reslice X ─┐
//!                        └─► reslice Y ─┤
//!                                       ├─► Gabor energy (gabor_axis) ─► reconstruct ─┐
//!                                       └─► 9-tap        (tap_axis)   ─► reconstruct ─┤
//!                                                                                     ▼
//!                                                                                FrameSink
//! ```
//!
//! The two filter branches share only read-only data and run concurrently.

use serde::{Deserialize, Serialize};
use stfilter_common::{StageClock, StageTiming, StfilterResult};

use crate::filter::SlitFilter;
use crate::gabor::GaborEnergyFilter;
use crate::io::{read_all, FrameSink, FrameSource};
use crate::kernel::{build_kernel_bank, DEFAULT_ORIENTATIONS};
use crate::plane::Frame;
use crate::reslice::{reconstruct_frames, reslice_along_x, reslice_along_y, Axis, SliceStack};
use crate::separable::SeparableTapFilter;
use crate::volume::FrameVolume;

/// Pipeline parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Reslice volume fed to the Gabor energy branch.
    pub gabor_axis: Axis,

    /// Reslice volume fed to the 9-tap branch.
    pub tap_axis: Axis,

    /// Output name for the reconstructed Gabor energy frames.
    pub gabor_output: String,

    /// Output name for the reconstructed 9-tap frames.
    pub tap_output: String,

    /// Frames handed to the sink are already 3-channel.
    pub color_output: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gabor_axis: Axis::Y,
            tap_axis: Axis::Y,
            gabor_output: "gabor-energy-x-t.avi".to_string(),
            tap_output: "9-Tap-x-t.avi".to_string(),
            color_output: false,
        }
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: String,
    pub frames: usize,
    pub width: usize,
    pub height: usize,
    pub gabor_axis: Axis,
    pub tap_axis: Axis,
    /// Output names in write order; empty until the outputs are written.
    pub outputs: Vec<String>,
    pub stages: Vec<StageTiming>,
}

impl RunSummary {
    pub fn to_json(&self) -> StfilterResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Reconstructed frames from both branches.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub gabor_energy: Vec<Frame>,
    pub nine_tap: Vec<Frame>,
    pub summary: RunSummary,
}

/// Motion-energy pipeline with its filters built once up front.
pub struct Pipeline {
    config: PipelineConfig,
    gabor: GaborEnergyFilter,
    tap: SeparableTapFilter,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        tracing::info!(orientations = ?DEFAULT_ORIENTATIONS, "Calculating Gabor kernels");
        Self {
            config,
            gabor: GaborEnergyFilter::new(build_kernel_bank(&DEFAULT_ORIENTATIONS)),
            tap: SeparableTapFilter::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(PipelineConfig::default())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build the volume, reslice, filter both branches and reconstruct.
    pub fn process(&self, frames: Vec<Frame>) -> StfilterResult<PipelineOutput> {
        let mut clock = StageClock::start();

        let volume = FrameVolume::new(frames)?;
        let (t_len, height, width) = volume.dims();
        clock.lap("volume");

        tracing::info!(frames = t_len, width, height, "Preparing spatio-temporal volumes");
        let (over_x, over_y) = rayon::join(|| reslice_along_x(&volume), || reslice_along_y(&volume));
        let ms = clock.lap("reslice");
        tracing::debug!(x_slits = over_x.len(), y_slits = over_y.len(), elapsed_ms = ms, "Resliced volume");

        let pick = |axis: Axis| match axis {
            Axis::X => &over_x,
            Axis::Y => &over_y,
        };
        let gabor_input = pick(self.config.gabor_axis);
        let tap_input = pick(self.config.tap_axis);

        // Reject bad shapes before either branch starts.
        self.gabor.validate(gabor_input)?;
        self.tap.validate(tap_input)?;

        tracing::info!(
            gabor_axis = %self.config.gabor_axis,
            tap_axis = %self.config.tap_axis,
            "Calculating Gabor energy and applying 9-tap filter"
        );
        let (gabor_energy, nine_tap) = rayon::join(
            || filter_and_reconstruct(&self.gabor, gabor_input),
            || filter_and_reconstruct(&self.tap, tap_input),
        );
        let gabor_energy = gabor_energy?;
        let nine_tap = nine_tap?;
        let ms = clock.lap("filter");
        tracing::info!(elapsed_ms = ms, "Reconstructed x-y frames");

        let summary = RunSummary {
            started_at: clock.epoch_wall().to_string(),
            frames: t_len,
            width,
            height,
            gabor_axis: self.config.gabor_axis,
            tap_axis: self.config.tap_axis,
            outputs: Vec::new(),
            stages: clock.into_laps(),
        };

        Ok(PipelineOutput {
            gabor_energy,
            nine_tap,
            summary,
        })
    }

    /// Decode everything from `source`, process, then write both outputs.
    ///
    /// Nothing reaches `sink` unless processing succeeded.
    pub fn run(
        &self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
    ) -> StfilterResult<RunSummary> {
        tracing::info!(source = source.name(), "Reading video");
        let mut clock = StageClock::start();
        let frames = read_all(source)?;
        let decode = clock.lap("decode");

        let output = self.process(frames)?;

        clock = StageClock::start();
        let outputs = [
            (&self.config.gabor_output, &output.gabor_energy, "Writing Gabor energy video"),
            (&self.config.tap_output, &output.nine_tap, "Writing 9-tap video"),
        ];
        for (index, (name, frames, message)) in outputs.iter().enumerate() {
            tracing::info!(sink = sink.name(), output = %name, "{message}");
            if let Err(err) = sink.write_frames(name, frames, self.config.color_output) {
                // Drop this output and every earlier one so no partial set remains.
                for (written, _, _) in &outputs[..=index] {
                    if let Err(discard_err) = sink.discard(written) {
                        tracing::warn!(output = %written, error = %discard_err, "Failed to remove output");
                    }
                }
                return Err(err);
            }
        }
        let write = clock.lap("write");

        let mut summary = output.summary;
        summary.stages.insert(
            0,
            StageTiming {
                stage: "decode".to_string(),
                elapsed_ms: decode,
            },
        );
        summary.stages.push(StageTiming {
            stage: "write".to_string(),
            elapsed_ms: write,
        });
        summary.outputs = vec![self.config.gabor_output.clone(), self.config.tap_output.clone()];
        Ok(summary)
    }
}

fn filter_and_reconstruct(filter: &dyn SlitFilter, stack: &SliceStack) -> StfilterResult<Vec<Frame>> {
    let filtered = filter.apply(stack)?;
    reconstruct_frames(&filtered, stack.axis())
}
