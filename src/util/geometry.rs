// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module maps between display coordinates (where the pointer lives)
//! and source-video pixel coordinates. A single uniform [`Scale`] relates
//! the two; it is computed once per rendered frame from the video's native
//! dimensions and the space available for drawing, and the same value must
//! be used in both directions.

use crate::models::annotation::Position;

/// Pixel dimensions of a video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Uniform factor from video pixels to display units. Never above 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f64);

impl Scale {
    /// The scale used when the video already fits.
    pub const IDENTITY: Scale = Scale(1.0);

    /// Compute the fit scale: `min(display_w / video_w, display_h / video_h, 1)`.
    ///
    /// Returns `None` when either size has no area (e.g. a minimised window),
    /// since no finite inverse mapping exists then.
    pub fn fit(video: FrameSize, display_width: f64, display_height: f64) -> Option<Self> {
        if video.width == 0 || video.height == 0 {
            return None;
        }
        if !(display_width > 0.0 && display_height > 0.0) {
            return None;
        }

        let scale_w = display_width / video.width as f64;
        let scale_h = display_height / video.height as f64;
        Some(Scale(scale_w.min(scale_h).min(1.0)))
    }

    pub fn factor(&self) -> f64 {
        self.0
    }

    /// True when no resize is needed (scaling only ever shrinks).
    pub fn is_identity(&self) -> bool {
        self.0 >= 1.0
    }

    /// Video → display, rounded to the nearest integer.
    pub fn to_display(&self, x: f64, y: f64) -> (i64, i64) {
        ((x * self.0).round() as i64, (y * self.0).round() as i64)
    }

    /// Display → video, rounded to the nearest integer.
    pub fn to_video(&self, x: f64, y: f64) -> Position {
        Position {
            x: (x / self.0).round() as i64,
            y: (y / self.0).round() as i64,
        }
    }

    /// Size a frame of `size` is resized to for display.
    pub fn display_size(&self, size: FrameSize) -> FrameSize {
        if self.is_identity() {
            return size;
        }
        let (w, h) = self.to_display(size.width as f64, size.height as f64);
        FrameSize::new(w.max(1) as u32, h.max(1) as u32)
    }
}
