//! Time-ordered frame volume.

use stfilter_common::{StfilterError, StfilterResult};

use crate::plane::{Plane, Sample};

/// An ordered `T × H × W` stack of frames with identical dimensions.
///
/// Construction validates that the volume is non-empty and that every frame
/// has the same non-zero width and height, so reslicing never has to.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameVolume<T: Sample = u8> {
    frames: Vec<Plane<T>>,
    width: usize,
    height: usize,
}

impl<T: Sample> FrameVolume<T> {
    pub fn new(frames: Vec<Plane<T>>) -> StfilterResult<Self> {
        let Some(first) = frames.first() else {
            return Err(StfilterError::validation("frame volume is empty"));
        };
        let (width, height) = (first.width(), first.height());
        if first.is_empty() {
            return Err(StfilterError::validation(format!(
                "frames have zero size ({width}x{height})"
            )));
        }

        if let Some((index, frame)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.width() != width || f.height() != height)
        {
            return Err(StfilterError::validation(format!(
                "frame {index} is {}x{}, expected {width}x{height}",
                frame.width(),
                frame.height()
            )));
        }

        Ok(Self {
            frames,
            width,
            height,
        })
    }

    /// Number of frames (T).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(T, H, W)`.
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.frames.len(), self.height, self.width)
    }

    pub fn frames(&self) -> &[Plane<T>] {
        &self.frames
    }

    pub fn frame(&self, t: usize) -> Option<&Plane<T>> {
        self.frames.get(t)
    }

    pub fn into_frames(self) -> Vec<Plane<T>> {
        self.frames
    }
}
