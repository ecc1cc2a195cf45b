//! stfilter Video I/O
//!
//! Frame acquisition and container writing through an external `ffmpeg`
//! process. Frames cross the process boundary as raw 8-bit planes:
//!
//! ```text
//! input.mp4 ── ffprobe (W×H) ── ffmpeg -f rawvideo -pix_fmt gray ──► FfmpegSource ──► Frame…
//! Frame… ──► gray → bgr24 ──► ffmpeg -f rawvideo -i - -c:v mjpeg ──► name.avi
//! ```

pub mod color;
pub mod ffmpeg;

pub use ffmpeg::{command_exists, FfmpegSink, FfmpegSource};
