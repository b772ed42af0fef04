// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video metadata via `ffprobe`.
//!
//! Runs `ffprobe` once at startup and reads the first video stream's frame
//! rate and dimensions from its JSON output.

use crate::util::geometry::FrameSize;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;
use thiserror::Error;

/// Failures while probing a video file.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("ffprobe exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("could not parse ffprobe output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no video stream found")]
    NoVideoStream,
    #[error("invalid frame rate {0:?}")]
    FrameRate(String),
    #[error("invalid frame size {width}x{height}")]
    FrameSize { width: u32, height: u32 },
}

/// Frame rate as the rational ffprobe reports (e.g. `30000/1001`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRate {
    pub num: f64,
    pub den: f64,
}

impl FrameRate {
    pub fn fps(&self) -> f64 {
        self.num / self.den
    }
}

impl FromStr for FrameRate {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProbeError::FrameRate(s.to_string());
        let (num, den) = match s.trim().split_once('/') {
            Some((num, den)) => (
                num.trim().parse::<f64>().map_err(|_| invalid())?,
                den.trim().parse::<f64>().map_err(|_| invalid())?,
            ),
            None => (s.trim().parse::<f64>().map_err(|_| invalid())?, 1.0),
        };

        if !(num.is_finite() && den.is_finite() && num > 0.0 && den > 0.0) {
            return Err(invalid());
        }
        Ok(Self { num, den })
    }
}

/// What the rest of the program needs to know about the video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetadata {
    pub frame_rate: FrameRate,
    pub size: FrameSize,
}

impl VideoMetadata {
    pub fn fps(&self) -> f64 {
        self.frame_rate.fps()
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

/// Parse the JSON printed by `ffprobe -show_streams -of json`.
pub fn parse_probe_output(json: &str) -> Result<VideoMetadata, ProbeError> {
    let output: ProbeOutput = serde_json::from_str(json)?;

    let stream = output
        .streams
        .into_iter()
        .find(|s| s.codec_type.as_deref().map_or(true, |t| t == "video") && s.width.is_some())
        .ok_or(ProbeError::NoVideoStream)?;

    let width = stream.width.unwrap_or(0);
    let height = stream.height.unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(ProbeError::FrameSize { width, height });
    }

    let frame_rate = stream
        .r_frame_rate
        .as_deref()
        .ok_or_else(|| ProbeError::FrameRate(String::new()))?
        .parse()?;

    Ok(VideoMetadata {
        frame_rate,
        size: FrameSize::new(width, height),
    })
}

/// Probe `path` with the given `ffprobe` executable.
pub fn probe(ffprobe: &str, path: &Path) -> Result<VideoMetadata, ProbeError> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=codec_type,width,height,r_frame_rate",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|source| ProbeError::Spawn {
            program: ffprobe.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ProbeError::Failed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let metadata = parse_probe_output(&String::from_utf8_lossy(&output.stdout))?;
    log::debug!("Probed {}: {:?}", path.display(), metadata);
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate_rational() {
        let rate: FrameRate = "30000/1001".parse().unwrap();
        assert!((rate.fps() - 29.970_029_97).abs() < 1e-6);

        let rate: FrameRate = "25/1".parse().unwrap();
        assert_eq!(rate.fps(), 25.0);
    }

    #[test]
    fn test_parse_frame_rate_plain_number() {
        let rate: FrameRate = "59.94".parse().unwrap();
        assert_eq!(rate.fps(), 59.94);
    }

    #[test]
    fn test_parse_frame_rate_rejects_garbage() {
        assert!("0/0".parse::<FrameRate>().is_err());
        assert!("30/0".parse::<FrameRate>().is_err());
        assert!("abc".parse::<FrameRate>().is_err());
        assert!("".parse::<FrameRate>().is_err());
    }

    #[test]
    fn test_parse_probe_output() {
        let json = r#"{
            "programs": [],
            "streams": [
                {
                    "codec_type": "video",
                    "width": 1920,
                    "height": 1080,
                    "r_frame_rate": "30/1"
                }
            ]
        }"#;

        let metadata = parse_probe_output(json).unwrap();
        assert_eq!(metadata.size, FrameSize::new(1920, 1080));
        assert_eq!(metadata.fps(), 30.0);
    }

    #[test]
    fn test_parse_probe_output_skips_audio() {
        let json = r#"{"streams": [
            {"codec_type": "audio", "r_frame_rate": "0/0"},
            {"codec_type": "video", "width": 640, "height": 480, "r_frame_rate": "24000/1001"}
        ]}"#;

        let metadata = parse_probe_output(json).unwrap();
        assert_eq!(metadata.size, FrameSize::new(640, 480));
    }

    #[test]
    fn test_parse_probe_output_without_video() {
        let err = parse_probe_output(r#"{"streams": []}"#).unwrap_err();
        assert!(matches!(err, ProbeError::NoVideoStream));
    }

    #[test]
    fn test_parse_probe_output_zero_size() {
        let json = r#"{"streams": [{"codec_type": "video", "width": 0, "height": 480, "r_frame_rate": "25/1"}]}"#;
        let err = parse_probe_output(json).unwrap_err();
        assert!(matches!(err, ProbeError::FrameSize { width: 0, height: 480 }));
    }

    #[test]
    fn test_parse_probe_output_bad_json() {
        assert!(matches!(parse_probe_output("not json"), Err(ProbeError::Json(_))));
    }

    #[test]
    fn test_probe_missing_program() {
        let err = probe("definitely-not-a-real-ffprobe", Path::new("video.mp4")).unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }
}
