// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Elapsed-time overlay text.

/// Format the elapsed time of `frame_index` at `fps` as `MM:SS`.
///
/// Minutes keep growing past 59 (no hour field), so long videos show
/// e.g. `125:03`.
pub fn format_elapsed(frame_index: u64, fps: f64) -> String {
    let seconds = if fps > 0.0 {
        frame_index as f64 / fps
    } else {
        0.0
    };

    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{:02}:{:02}", minutes, secs)
}
