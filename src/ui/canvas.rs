// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video display canvas.
//!
//! Draws the current frame at the panel's top-left corner, one texel per
//! physical pixel (the texture is already fitted to the display), with the
//! elapsed time on top.

/// Elapsed-time text and where to put it.
pub struct TimeOverlay<'a> {
    pub text: &'a str,
    pub font_size: f32,
    pub offset: f32,
}

/// Draw the canvas. Returns the frame origin used for pointer mapping.
pub fn show(
    ui: &mut egui::Ui,
    texture: Option<&egui::TextureHandle>,
    overlay: Option<TimeOverlay<'_>>,
) -> egui::Pos2 {
    let rect = ui.max_rect();
    let origin = rect.min;
    ui.painter().rect_filled(rect, 0.0, egui::Color32::BLACK);

    match texture {
        Some(texture) => {
            // One texel per physical pixel.
            let size = texture.size_vec2() / ui.ctx().pixels_per_point();
            let painter = ui.painter();
            let image_rect = egui::Rect::from_min_size(origin, size);
            painter.image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            if let Some(overlay) = overlay {
                painter.text(
                    origin + egui::vec2(overlay.offset, overlay.offset),
                    egui::Align2::LEFT_TOP,
                    overlay.text,
                    egui::FontId::proportional(overlay.font_size),
                    egui::Color32::WHITE,
                );
            }
        }
        None => {
            ui.centered_and_justified(|ui| {
                ui.label(
                    egui::RichText::new("Loading video...")
                        .color(egui::Color32::from_gray(180)),
                );
            });
        }
    }

    origin
}
