//! Volume reslicing between x–y frames and x–t / y–t slit images.
//!
//! ```text
//!            frame t (H × W)               slit (T × ·)
//!   along X: column x of every frame  ->  slit x, row t = column x of frame t   (T × H)
//!   along Y: row y of every frame     ->  slit y, row t = row y of frame t      (T × W)
//! ```
//!
//! Reslicing is a pure rearrangement: every slit is a freshly allocated,
//! pre-sized buffer filled by explicit index mapping, and sample values are
//! copied verbatim. Slits are built in parallel, one task per slit.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use stfilter_common::{StfilterError, StfilterResult};

use crate::plane::{Plane, Sample};
use crate::volume::FrameVolume;

/// Spatial axis a volume is resliced along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// One slit per column; slits are `T × H`.
    X,
    /// One slit per row; slits are `T × W`.
    Y,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = StfilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            other => Err(StfilterError::config(format!(
                "unknown axis '{other}' (expected x or y)"
            ))),
        }
    }
}

/// Ordered slit images produced by reslicing along one axis.
///
/// Invariant: non-empty, and every slit has the same `(rows, cols)` shape,
/// where rows index time.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceStack<T: Sample = u8> {
    axis: Axis,
    slits: Vec<Plane<T>>,
}

impl<T: Sample> SliceStack<T> {
    pub fn new(axis: Axis, slits: Vec<Plane<T>>) -> StfilterResult<Self> {
        let Some(first) = slits.first() else {
            return Err(StfilterError::validation("slice stack is empty"));
        };
        let shape = first.shape();
        if first.is_empty() {
            return Err(StfilterError::validation(format!(
                "slit images have zero size ({}x{})",
                shape.0, shape.1
            )));
        }
        if let Some(index) = slits.iter().position(|s| s.shape() != shape) {
            return Err(StfilterError::validation(format!(
                "slit {index} has shape {:?}, expected {:?}",
                slits[index].shape(),
                shape
            )));
        }
        Ok(Self { axis, slits })
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Number of slit images (W for X, H for Y).
    pub fn len(&self) -> usize {
        self.slits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slits.is_empty()
    }

    pub fn slits(&self) -> &[Plane<T>] {
        &self.slits
    }

    pub fn slit(&self, index: usize) -> Option<&Plane<T>> {
        self.slits.get(index)
    }

    /// Shared `(rows, cols)` = `(T, orthogonal spatial size)`.
    pub fn slit_shape(&self) -> (usize, usize) {
        self.slits[0].shape()
    }

    /// Number of time samples per slit.
    pub fn time_len(&self) -> usize {
        self.slit_shape().0
    }

    pub fn into_slits(self) -> Vec<Plane<T>> {
        self.slits
    }
}

/// One `T × H` slit per column `x`; slit row `t` is column `x` of frame `t`.
pub fn reslice_along_x<T: Sample>(volume: &FrameVolume<T>) -> SliceStack<T> {
    let (t_len, height, width) = volume.dims();
    let frames = volume.frames();

    let slits = (0..width)
        .into_par_iter()
        .map(|x| {
            let mut data = vec![T::default(); t_len * height];
            for (t, frame) in frames.iter().enumerate() {
                let dst = &mut data[t * height..(t + 1) * height];
                for (y, sample) in dst.iter_mut().enumerate() {
                    *sample = frame.row(y)[x];
                }
            }
            Plane::from_parts(height, t_len, data)
        })
        .collect();

    SliceStack {
        axis: Axis::X,
        slits,
    }
}

/// One `T × W` slit per row `y`; slit row `t` is row `y` of frame `t`.
pub fn reslice_along_y<T: Sample>(volume: &FrameVolume<T>) -> SliceStack<T> {
    let (t_len, height, width) = volume.dims();
    let frames = volume.frames();

    let slits = (0..height)
        .into_par_iter()
        .map(|y| {
            let mut data = vec![T::default(); t_len * width];
            for (t, frame) in frames.iter().enumerate() {
                data[t * width..(t + 1) * width].copy_from_slice(frame.row(y));
            }
            Plane::from_parts(width, t_len, data)
        })
        .collect();

    SliceStack {
        axis: Axis::Y,
        slits,
    }
}

pub fn reslice<T: Sample>(volume: &FrameVolume<T>, axis: Axis) -> SliceStack<T> {
    match axis {
        Axis::X => reslice_along_x(volume),
        Axis::Y => reslice_along_y(volume),
    }
}

/// Rebuild the `T` frames (`H × W`) a stack was resliced from.
///
/// `axis` names the layout of `stack` and must match the axis it records;
/// a filtered stack keeps the axis of its input so this also rebuilds
/// displayable frames from energy maps.
pub fn reconstruct_frames<T: Sample>(
    stack: &SliceStack<T>,
    axis: Axis,
) -> StfilterResult<Vec<Plane<T>>> {
    if stack.axis() != axis {
        return Err(StfilterError::validation(format!(
            "cannot reconstruct along {axis}: stack was resliced along {}",
            stack.axis()
        )));
    }

    let (t_len, cols) = stack.slit_shape();
    let slits = stack.slits();

    let frames = match axis {
        // W slits of T × H: frame t pixel (x, y) = slit x at (row t, col y).
        Axis::X => {
            let (width, height) = (slits.len(), cols);
            (0..t_len)
                .into_par_iter()
                .map(|t| {
                    let mut data = vec![T::default(); height * width];
                    for (x, slit) in slits.iter().enumerate() {
                        for (y, &sample) in slit.row(t).iter().enumerate() {
                            data[y * width + x] = sample;
                        }
                    }
                    Plane::from_parts(width, height, data)
                })
                .collect()
        }
        // H slits of T × W: frame t row y = slit y row t.
        Axis::Y => {
            let (width, height) = (cols, slits.len());
            (0..t_len)
                .into_par_iter()
                .map(|t| {
                    let mut data = vec![T::default(); height * width];
                    for (y, slit) in slits.iter().enumerate() {
                        data[y * width..(y + 1) * width].copy_from_slice(slit.row(t));
                    }
                    Plane::from_parts(width, height, data)
                })
                .collect()
        }
    };

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame t sample (x, y) = 100 * t + 10 * y + x, distinct for small volumes.
    fn ramp_volume(t_len: usize, height: usize, width: usize) -> FrameVolume<u8> {
        let frames = (0..t_len)
            .map(|t| {
                let data = (0..height)
                    .flat_map(|y| (0..width).map(move |x| (100 * t + 10 * y + x) as u8))
                    .collect();
                Plane::from_vec(width, height, data).unwrap()
            })
            .collect();
        FrameVolume::new(frames).unwrap()
    }

    #[test]
    fn axis_parses_case_insensitively() {
        assert_eq!("Y".parse::<Axis>().unwrap(), Axis::Y);
        assert_eq!(" x ".parse::<Axis>().unwrap(), Axis::X);
        assert!("z".parse::<Axis>().is_err());
    }

    #[test]
    fn reslice_x_maps_columns_to_slits() {
        let volume = ramp_volume(2, 3, 4);
        let stack = reslice_along_x(&volume);
        assert_eq!(stack.len(), 4);
        assert_eq!(stack.slit_shape(), (2, 3));
        // slit 2, row t = 1, col y = 0 -> frame 1 pixel (x=2, y=0)
        assert_eq!(stack.slit(2).unwrap().get(0, 1), 102);
        assert_eq!(stack.slit(3).unwrap().row(0), &[3, 13, 23]);
    }

    #[test]
    fn reslice_y_maps_rows_to_slits() {
        let volume = ramp_volume(3, 2, 4);
        let stack = reslice_along_y(&volume);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.slit_shape(), (3, 4));
        assert_eq!(stack.slit(1).unwrap().row(2), &[210, 211, 212, 213]);
    }

    #[test]
    fn reconstruct_inverts_both_axes() {
        let volume = ramp_volume(3, 4, 5);
        for axis in [Axis::X, Axis::Y] {
            let frames = reconstruct_frames(&reslice(&volume, axis), axis).unwrap();
            assert_eq!(frames, volume.frames(), "axis {axis}");
        }
    }

    #[test]
    fn reconstruct_rejects_axis_mismatch() {
        let volume = ramp_volume(2, 2, 2);
        let stack = reslice_along_y(&volume);
        let err = reconstruct_frames(&stack, Axis::X).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn slice_stack_rejects_ragged_slits() {
        let slits = vec![Plane::<u8>::new(4, 3), Plane::new(3, 3)];
        assert!(SliceStack::new(Axis::Y, slits).unwrap_err().is_validation());
        assert!(SliceStack::<u8>::new(Axis::Y, Vec::new()).is_err());
    }
}
