// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame sources for video playback.
//!
//! A [`FrameSource`] yields `(index, image)` pairs in increasing index order
//! and reports `None` once the video is exhausted. The default source pipes
//! raw RGB frames out of an `ffmpeg` subprocess; an OpenCV-backed source is
//! available with the `video-opencv` feature.

use crate::io::probe::VideoMetadata;
use crate::util::geometry::FrameSize;
use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

/// One decoded frame.
pub struct Frame {
    pub index: u64,
    pub image: RgbImage,
}

/// Pull interface over decoded video frames.
pub trait FrameSource {
    /// Next frame, or `None` at end of video.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Index of the first frame after skipping `skip_seconds`.
pub fn start_index(skip_seconds: f64, fps: f64) -> u64 {
    if skip_seconds <= 0.0 || fps <= 0.0 {
        return 0;
    }
    (skip_seconds * fps).round() as u64
}

/// Frames decoded by an `ffmpeg` child process writing rgb24 to stdout.
pub struct FfmpegFrameSource {
    child: Child,
    stdout: BufReader<ChildStdout>,
    size: FrameSize,
    next_index: u64,
    exhausted: bool,
}

impl FfmpegFrameSource {
    /// Spawn `ffmpeg` decoding `path` from `skip_seconds` onwards.
    pub fn open(
        ffmpeg: &str,
        path: &Path,
        metadata: &VideoMetadata,
        skip_seconds: f64,
    ) -> Result<Self> {
        let seek = skip_seconds.max(0.0);
        let mut child = Command::new(ffmpeg)
            .args(["-v", "error", "-nostdin", "-noautorotate", "-ss"])
            .arg(format!("{:.6}", seek))
            .arg("-i")
            .arg(path)
            .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to spawn {}", ffmpeg))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("Failed to open {} stdout", ffmpeg))?;

        let next_index = start_index(seek, metadata.fps());
        log::info!(
            "Decoding {} from {:.2}s (frame {})",
            path.display(),
            seek,
            next_index
        );

        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            size: metadata.size,
            next_index,
            exhausted: false,
        })
    }

    fn frame_bytes(&self) -> usize {
        self.size.width as usize * self.size.height as usize * 3
    }
}

impl FrameSource for FfmpegFrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut buffer = vec![0u8; self.frame_bytes()];
        match self.stdout.read_exact(&mut buffer) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.exhausted = true;
                let status = self
                    .child
                    .wait()
                    .context("Failed to wait for ffmpeg")?;
                if !status.success() {
                    return Err(anyhow!("ffmpeg exited with {}", status));
                }
                return Ok(None);
            }
            Err(e) => return Err(e).context("Failed to read frame from ffmpeg"),
        }

        let image = RgbImage::from_raw(self.size.width, self.size.height, buffer)
            .ok_or_else(|| anyhow!("Decoded frame does not match {:?}", self.size))?;

        let index = self.next_index;
        self.next_index += 1;
        Ok(Some(Frame { index, image }))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        // ffmpeg keeps decoding into a full pipe otherwise.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(feature = "video-opencv")]
pub use self::opencv_source::OpenCvFrameSource;

#[cfg(feature = "video-opencv")]
mod opencv_source {
    use super::{start_index, Frame, FrameSource};
    use anyhow::{anyhow, Context, Result};
    use image::RgbImage;
    use opencv::{
        core::Mat,
        imgproc,
        prelude::*,
        videoio::{VideoCapture, CAP_ANY, CAP_PROP_POS_MSEC},
    };
    use std::path::Path;

    /// Frames decoded in-process by OpenCV.
    pub struct OpenCvFrameSource {
        capture: VideoCapture,
        next_index: u64,
        exhausted: bool,
    }

    impl OpenCvFrameSource {
        pub fn open(path: &Path, fps: f64, skip_seconds: f64) -> Result<Self> {
            let path_str = path
                .to_str()
                .ok_or_else(|| anyhow!("Path is not valid UTF-8: {}", path.display()))?;
            let mut capture = VideoCapture::from_file(path_str, CAP_ANY)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            if !capture.is_opened()? {
                return Err(anyhow!("Failed to open video file: {}", path.display()));
            }

            let seek = skip_seconds.max(0.0);
            if seek > 0.0 {
                capture.set(CAP_PROP_POS_MSEC, seek * 1000.0)?;
            }

            Ok(Self {
                capture,
                next_index: start_index(seek, fps),
                exhausted: false,
            })
        }
    }

    impl FrameSource for OpenCvFrameSource {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            if self.exhausted {
                return Ok(None);
            }

            let mut bgr = Mat::default();
            if !self.capture.read(&mut bgr)? || bgr.empty() {
                self.exhausted = true;
                return Ok(None);
            }

            let mut rgb = Mat::default();
            imgproc::cvt_color(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

            let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
            let image = RgbImage::from_raw(width, height, rgb.data_bytes()?.to_vec())
                .ok_or_else(|| anyhow!("Unexpected frame layout {}x{}", width, height))?;

            let index = self.next_index;
            self.next_index += 1;
            Ok(Some(Frame { index, image }))
        }
    }
}

/// In-memory source for tests.
#[cfg(test)]
pub struct MemoryFrameSource {
    frames: std::collections::VecDeque<Frame>,
}

#[cfg(test)]
impl MemoryFrameSource {
    /// `count` solid frames of `size` numbered from `first`.
    pub fn solid(size: FrameSize, first: u64, count: u64) -> Self {
        let frames = (first..first + count)
            .map(|index| Frame {
                index,
                image: RgbImage::from_pixel(size.width, size.height, image::Rgb([index as u8, 0, 0])),
            })
            .collect();
        Self { frames }
    }
}

#[cfg(test)]
impl FrameSource for MemoryFrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}
