//! stfilter Core: spatiotemporal motion energy
//!
//! Turns a stack of grayscale frames into motion-energy videos:
//! - **Reslicing:** reorder the frame volume into x–t / y–t slit images and back
//! - **Gabor energy:** quadrature energy of an oriented 9×9 Gabor bank per slit
//! - **9-tap filter:** fixed separable spatial/temporal band-pass per slit
//! - **Pipeline:** run both branches and reconstruct x–y frames
//!
//! This crate is pure computation. Frame decoding and encoding sit behind
//! the [`FrameSource`] and [`FrameSink`] traits.

pub mod convolve;
pub mod filter;
pub mod gabor;
pub mod io;
pub mod kernel;
pub mod normalize;
pub mod pipeline;
pub mod plane;
pub mod reslice;
pub mod separable;
pub mod volume;

pub use filter::SlitFilter;
pub use gabor::{compute_energy, GaborEnergyFilter};
pub use io::{FrameSink, FrameSource, MemorySink, VecSource};
pub use kernel::{build_kernel_bank, KernelBank};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput, RunSummary};
pub use plane::{Frame, Plane, Sample};
pub use reslice::{reconstruct_frames, reslice, reslice_along_x, reslice_along_y, Axis, SliceStack};
pub use separable::SeparableTapFilter;
pub use volume::FrameVolume;
