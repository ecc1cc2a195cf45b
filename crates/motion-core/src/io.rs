//! Frame source and sink seams at the pipeline boundary.
//!
//! Decoding and encoding are blocking calls made before and after all
//! compute stages; they never overlap with filtering.

use stfilter_common::StfilterResult;

use crate::plane::Frame;

/// Produces an ordered, finite sequence of equally sized frames.
pub trait FrameSource {
    /// Next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> StfilterResult<Option<Frame>>;

    /// Source identifier for logs.
    fn name(&self) -> &str;
}

/// Drain `source` completely.
pub fn read_all(source: &mut dyn FrameSource) -> StfilterResult<Vec<Frame>> {
    let mut frames = Vec::new();
    while let Some(frame) = source.next_frame()? {
        frames.push(frame);
    }
    tracing::debug!(source = source.name(), frames = frames.len(), "Source drained");
    Ok(frames)
}

/// Consumes a complete frame sequence under an output name.
pub trait FrameSink {
    /// Write `frames` as `name`. When `is_color` is false the frames are
    /// grayscale and may be expanded to three channels by the sink.
    fn write_frames(&mut self, name: &str, frames: &[Frame], is_color: bool) -> StfilterResult<()>;

    /// Remove whatever was written as `name`, if anything. Used to leave no
    /// partial output behind when a later write fails.
    fn discard(&mut self, _name: &str) -> StfilterResult<()> {
        Ok(())
    }

    /// Sink identifier for logs.
    fn name(&self) -> &str;
}

/// In-memory source over pre-decoded frames.
#[derive(Debug)]
pub struct VecSource {
    frames: std::vec::IntoIter<Frame>,
}

impl VecSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> StfilterResult<Option<Frame>> {
        Ok(self.frames.next())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// In-memory sink that keeps every written sequence.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub written: Vec<(String, Vec<Frame>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[Frame]> {
        self.written
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, frames)| frames.as_slice())
    }
}

impl FrameSink for MemorySink {
    fn write_frames(&mut self, name: &str, frames: &[Frame], _is_color: bool) -> StfilterResult<()> {
        self.written.push((name.to_string(), frames.to_vec()));
        Ok(())
    }

    fn discard(&mut self, name: &str) -> StfilterResult<()> {
        self.written.retain(|(n, _)| n != name);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
