//! ffmpeg subprocess backends for [`FrameSource`] and [`FrameSink`].

use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

use stfilter_common::error::{StfilterError, StfilterResult};
use stfilter_core::{Frame, FrameSink, FrameSource, Plane};

use crate::color::{frame_bytes, PixelLayout};

/// Default output frame rate.
pub const DEFAULT_FPS: u32 = 24;

/// Decodes a video file into grayscale frames through `ffmpeg`.
pub struct FfmpegSource {
    name: String,
    width: usize,
    height: usize,
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr_task: Option<JoinHandle<String>>,
    frames_read: usize,
    finished: bool,
}

impl FfmpegSource {
    /// Probe `path` for its dimensions and start decoding.
    pub fn open(path: impl AsRef<Path>) -> StfilterResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StfilterError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        for binary in ["ffmpeg", "ffprobe"] {
            if !command_exists(binary) {
                return Err(StfilterError::source(format!(
                    "{binary} not found in PATH; cannot decode {}",
                    path.display()
                )));
            }
        }

        let (width, height) = probe_video_dimensions(path).ok_or_else(|| {
            StfilterError::source(format!("Cannot read video stream of {}", path.display()))
        })?;

        let args = decode_args(path);
        tracing::debug!(args = ?args, "Running ffmpeg decoder");
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StfilterError::source(format!("Failed to start ffmpeg: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| StfilterError::source("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| StfilterError::source("Failed to capture ffmpeg stderr"))?;

        tracing::info!(
            path = %path.display(),
            width,
            height,
            pid = child.id(),
            "Opened video source"
        );

        Ok(Self {
            name: path.display().to_string(),
            width: width as usize,
            height: height as usize,
            child,
            stdout: BufReader::new(stdout),
            stderr_task: Some(drain_stderr(stderr)),
            frames_read: 0,
            finished: false,
        })
    }

    /// `(width, height)` of decoded frames.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Reap the decoder after end of stream and surface a failed exit.
    fn finish(&mut self) -> StfilterResult<()> {
        self.finished = true;
        let status = self
            .child
            .wait()
            .map_err(|e| StfilterError::source(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = join_stderr(self.stderr_task.take());
        if !status.success() {
            return Err(StfilterError::source(format!(
                "ffmpeg decode failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }
        tracing::debug!(frames = self.frames_read, "ffmpeg decoder finished");
        Ok(())
    }
}

impl FrameSource for FfmpegSource {
    fn next_frame(&mut self) -> StfilterResult<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.width * self.height];
        let filled = read_full(&mut self.stdout, &mut buf)
            .map_err(|e| StfilterError::source(format!("Failed reading decoded frames: {e}")))?;

        if filled == 0 {
            self.finish()?;
            return Ok(None);
        }
        if filled < buf.len() {
            self.finish()?;
            return Err(StfilterError::source(format!(
                "Truncated frame {} ({filled} of {} bytes)",
                self.frames_read,
                buf.len()
            )));
        }

        self.frames_read += 1;
        Plane::from_vec(self.width, self.height, buf).map(Some)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Encodes frame sequences into MJPEG AVI files through `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegSink {
    output_dir: PathBuf,
    fps: u32,
}

impl FfmpegSink {
    pub fn new(output_dir: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            output_dir: output_dir.into(),
            fps: fps.max(1),
        }
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

impl FrameSink for FfmpegSink {
    /// Gray frames are expanded to bgr24 unless `is_color` is set, in which
    /// case the planes are passed through as a single channel.
    fn write_frames(&mut self, name: &str, frames: &[Frame], is_color: bool) -> StfilterResult<()> {
        let (width, height) = uniform_dimensions(frames)?;
        if !command_exists("ffmpeg") {
            return Err(StfilterError::sink("ffmpeg not found in PATH"));
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_path(name);
        let layout = if is_color {
            PixelLayout::Gray
        } else {
            PixelLayout::Bgr24
        };

        let args = encode_args(width, height, self.fps, layout, &output_path);
        tracing::debug!(args = ?args, "Running ffmpeg encoder");
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StfilterError::sink(format!("Failed to start ffmpeg: {e}")))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| StfilterError::sink("Failed to capture ffmpeg stderr"))?;
        let stderr_task = drain_stderr(stderr);

        let write_result = {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| StfilterError::sink("Failed to open ffmpeg stdin"))?;
            frames
                .iter()
                .try_for_each(|frame| stdin.write_all(&frame_bytes(frame, layout)))
            // stdin dropped here so ffmpeg sees end of input
        };

        let status = child
            .wait()
            .map_err(|e| StfilterError::sink(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = join_stderr(Some(stderr_task));

        if let Err(e) = write_result {
            return Err(StfilterError::sink(format!(
                "Failed writing frames to ffmpeg: {e}: {}",
                stderr_output.trim()
            )));
        }
        if !status.success() {
            return Err(StfilterError::sink(format!(
                "ffmpeg encode failed (status {}): {}",
                status,
                stderr_output.trim()
            )));
        }

        tracing::info!(
            output = %output_path.display(),
            frames = frames.len(),
            fps = self.fps,
            "Wrote video"
        );
        Ok(())
    }

    fn discard(&mut self, name: &str) -> StfilterResult<()> {
        let path = self.output_path(name);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(output = %path.display(), "Removed partial output");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Arguments decoding `path` to raw 8-bit gray frames on stdout.
pub fn decode_args(path: &Path) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        // Keep the stored orientation so frames match the probed W×H.
        "-noautorotate".to_string(),
        "-i".to_string(),
        path.display().to_string(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "gray".to_string(),
        "-".to_string(),
    ]
}

/// Arguments encoding raw frames from stdin into an MJPEG file.
pub fn encode_args(
    width: usize,
    height: usize,
    fps: u32,
    layout: PixelLayout,
    output: &Path,
) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        layout.ffmpeg_name().to_string(),
        "-s".to_string(),
        format!("{width}x{height}"),
        "-r".to_string(),
        fps.to_string(),
        "-i".to_string(),
        "-".to_string(),
        "-c:v".to_string(),
        "mjpeg".to_string(),
        "-q:v".to_string(),
        "3".to_string(),
        "-pix_fmt".to_string(),
        "yuvj444p".to_string(),
        output.display().to_string(),
    ]
}

pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn probe_video_dimensions(path: &Path) -> Option<(u32, u32)> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=p=0:s=x",
        ])
        .arg(path)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let raw = String::from_utf8(output.stdout).ok()?;
    parse_dimensions(&raw)
}

/// Parse `WxH` from the first line of ffprobe csv output.
fn parse_dimensions(raw: &str) -> Option<(u32, u32)> {
    let line = raw.lines().next()?.trim();
    let (w, h) = line.split_once('x')?;
    let width = w.parse::<u32>().ok()?;
    let height = h.parse::<u32>().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

fn uniform_dimensions(frames: &[Frame]) -> StfilterResult<(usize, usize)> {
    let first = frames
        .first()
        .ok_or_else(|| StfilterError::validation("No frames to write"))?;
    let dims = (first.width(), first.height());
    if frames.iter().any(|f| (f.width(), f.height()) != dims) {
        return Err(StfilterError::validation(
            "Frames in one output must share dimensions",
        ));
    }
    Ok(dims)
}

/// Read until `buf` is full or the reader is exhausted; returns bytes read.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// Drain stderr concurrently to avoid ffmpeg blocking on a full stderr pipe.
fn drain_stderr(stderr: impl Read + Send + 'static) -> JoinHandle<String> {
    std::thread::spawn(move || -> String {
        let mut reader = BufReader::new(stderr);
        let mut output = String::new();
        match reader.read_to_string(&mut output) {
            Ok(_) => output,
            Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
        }
    })
}

fn join_stderr(task: Option<JoinHandle<String>>) -> String {
    task.map(|t| {
        t.join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string())
    })
    .unwrap_or_default()
}
