// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings come from an optional YAML file; command-line flags override
//! individual fields.

use crate::cli::Args;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory the `<letter>.csv` files are written to.
    pub output_dir: PathBuf,
    /// Refresh tick period in milliseconds.
    pub tick_interval_ms: u64,
    pub overlay_font_size: f32,
    /// Distance of the time overlay from the top-left corner.
    pub overlay_offset: f32,
    /// `ffmpeg` executable used for decoding.
    pub ffmpeg: String,
    /// `ffprobe` executable used for metadata.
    pub ffprobe: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            tick_interval_ms: 1,
            overlay_font_size: 14.0,
            overlay_offset: 10.0,
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Settings file (if any) with command-line overrides applied.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut settings = match &args.config {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        if let Some(dir) = &args.output_dir {
            settings.output_dir = dir.clone();
        }
        Ok(settings)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
