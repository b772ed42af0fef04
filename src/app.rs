// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! The app is the top-level controller: it owns the window, the frame
//! source and the session. The session never closes the window itself; it
//! sends a [`Shutdown`] over a channel and the app closes the viewport.

use crate::config::Settings;
use crate::io::media::FrameSource;
use crate::render::RenderedFrame;
use crate::session::{Session, Shutdown};
use crate::ui::{canvas, input::InputTranslator, status_bar};
use crate::util::timecode::format_elapsed;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Error message of a failed session, read by `main` after the window closes.
pub type SessionOutcome = Arc<Mutex<Option<String>>>;

pub struct AnnotatorApp {
    session: Session,
    source: Box<dyn FrameSource>,
    shutdown: Receiver<Shutdown>,
    outcome: SessionOutcome,
    settings: Settings,
    input: InputTranslator,

    /// Texture holding the last rendered frame
    texture: Option<egui::TextureHandle>,

    last_tick: Option<Instant>,
    closing: bool,
}

impl AnnotatorApp {
    pub fn new(
        session: Session,
        source: Box<dyn FrameSource>,
        shutdown: Receiver<Shutdown>,
        settings: Settings,
        outcome: SessionOutcome,
    ) -> Self {
        Self {
            session,
            source,
            shutdown,
            outcome,
            settings,
            input: InputTranslator::new(),
            texture: None,
            last_tick: None,
            closing: false,
        }
    }

    /// Pull a frame if one is due and upload it. `display` is in physical pixels.
    fn step(&mut self, ctx: &egui::Context, display: egui::Vec2) {
        let (width, height) = (display.x as f64, display.y as f64);

        let result = if self.session.state().frame_index().is_none() {
            self.session.prime(self.source.as_mut(), width, height)
        } else {
            let due = self
                .last_tick
                .map_or(true, |t| t.elapsed() >= self.settings.tick_interval());
            if !due {
                return;
            }
            self.last_tick = Some(Instant::now());
            self.session.tick(self.source.as_mut(), width, height)
        };

        match result {
            Ok(Some(frame)) => self.upload(ctx, frame),
            Ok(None) => {}
            Err(e) => self.session.fail(e),
        }
    }

    fn upload(&mut self, ctx: &egui::Context, frame: RenderedFrame) {
        let frame_size = frame.size();
        let size = [frame_size.width as usize, frame_size.height as usize];
        let image = egui::ColorImage::from_rgb(size, frame.image.as_raw());

        if let Some(texture) = self.texture.as_mut() {
            texture.set(image, egui::TextureOptions::LINEAR);
        } else {
            self.texture = Some(ctx.load_texture("video_frame", image, egui::TextureOptions::LINEAR));
        }
    }

    fn check_shutdown(&mut self, ctx: &egui::Context) {
        while let Ok(signal) = self.shutdown.try_recv() {
            if let Shutdown::Failed(message) = signal {
                if let Ok(mut outcome) = self.outcome.lock() {
                    *outcome = Some(message);
                }
            }
            if !self.closing {
                log::info!("Closing window");
                self.closing = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_shutdown(ctx);
        if self.closing {
            return;
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            status_bar::show(ui, &self.session);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                // Fit in physical pixels so HiDPI displays are not downscaled twice.
                self.step(ctx, ui.available_size() * ctx.pixels_per_point());

                let time_text = self
                    .session
                    .state()
                    .frame_index()
                    .map(|index| format_elapsed(index, self.session.fps()));
                let overlay = time_text.as_deref().map(|text| canvas::TimeOverlay {
                    text,
                    font_size: self.settings.overlay_font_size,
                    offset: self.settings.overlay_offset,
                });
                let origin = canvas::show(ui, self.texture.as_ref(), overlay);

                let events = ctx.input(|i| self.input.translate(i, origin));
                for event in events {
                    if let Err(e) = self.session.handle(event) {
                        self.session.fail(e);
                        break;
                    }
                }
            });

        // Signals raised during this frame close the window without waiting a tick.
        self.check_shutdown(ctx);

        if !self.closing {
            ctx.request_repaint_after(self.settings.tick_interval());
        }
    }
}
