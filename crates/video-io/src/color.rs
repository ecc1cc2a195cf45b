//! Channel layout conversion for encoder input.

use stfilter_core::Frame;

/// Raw pixel layout handed to the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// One byte per pixel.
    Gray,
    /// Three bytes per pixel, blue-green-red order.
    Bgr24,
}

impl PixelLayout {
    /// ffmpeg `-pix_fmt` name.
    pub fn ffmpeg_name(self) -> &'static str {
        match self {
            PixelLayout::Gray => "gray",
            PixelLayout::Bgr24 => "bgr24",
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Gray => 1,
            PixelLayout::Bgr24 => 3,
        }
    }
}

/// Replicate each gray sample into B, G and R.
pub fn gray_to_bgr(frame: &Frame) -> Vec<u8> {
    frame.as_slice().iter().flat_map(|&v| [v, v, v]).collect()
}

/// Serialize a frame in the given layout.
pub fn frame_bytes(frame: &Frame, layout: PixelLayout) -> Vec<u8> {
    match layout {
        PixelLayout::Gray => frame.as_slice().to_vec(),
        PixelLayout::Bgr24 => gray_to_bgr(frame),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stfilter_core::Plane;

    #[test]
    fn gray_expands_to_three_equal_channels() {
        let frame = Plane::from_vec(2, 1, vec![7u8, 200]).unwrap();
        assert_eq!(gray_to_bgr(&frame), vec![7, 7, 7, 200, 200, 200]);
    }

    #[test]
    fn frame_bytes_length_matches_layout() {
        let frame = Plane::<u8>::new(5, 4);
        for layout in [PixelLayout::Gray, PixelLayout::Bgr24] {
            assert_eq!(frame_bytes(&frame, layout).len(), 20 * layout.bytes_per_pixel());
        }
    }
}
