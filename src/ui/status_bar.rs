// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Status strip below the video.
//!
//! Shows playback state, the active output file, the current frame and
//! the last recorded mark, plus a reminder of the key bindings.

use crate::session::Session;

/// Display the status bar for `session`.
pub fn show(ui: &mut egui::Ui, session: &Session) {
    let state = session.state();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let playback = if state.is_exited() {
            "■ Exited"
        } else if session.is_exhausted() {
            "■ End of video"
        } else if state.is_playing() {
            "▶ Playing"
        } else {
            "⏸ Paused"
        };
        ui.label(playback);

        ui.separator();
        match state.active_output() {
            Some(letter) => ui.label(format!("Output: {}", letter)),
            None => ui.label(egui::RichText::new("Output: none").weak()),
        };

        ui.separator();
        match state.frame_index() {
            Some(index) => ui.label(format!("Frame: {}", index)),
            None => ui.label("Frame: -"),
        };

        if let Some((letter, record)) = session.last_record() {
            ui.separator();
            ui.label(format!(
                "Last mark: frame {} at ({}, {}) → {}",
                record.frame, record.x, record.y, letter
            ));
        }

        ui.separator();
        ui.label(
            egui::RichText::new("A-Z: select file · Shift: mark breath · Space: play/pause · Esc: quit")
                .italics()
                .weak(),
        );
    });
}
