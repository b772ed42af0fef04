// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Keyboard and pointer translation.
//!
//! Letter keys select an output file, Shift records a breath mark, Space
//! toggles playback and Escape exits. egui reports Shift only as a modifier,
//! so a breath fires where Shift goes from up to down, checked against the
//! modifiers carried by each event and then the frame's modifiers. Focus
//! changes resync the Shift state without firing.

use crate::models::annotation::OutputLetter;
use crate::session::InputEvent;

/// Stateful translator from egui input to session events.
#[derive(Debug, Default)]
pub struct InputTranslator {
    shift_down: bool,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events for this frame. Pointer positions are made relative to `origin`
    /// and converted from points to physical pixels.
    pub fn translate(&mut self, input: &egui::InputState, origin: egui::Pos2) -> Vec<InputEvent> {
        let pixels_per_point = input.pixels_per_point() as f64;
        let mut events = Vec::new();
        let mut focus_changed = false;

        for event in &input.events {
            match event {
                egui::Event::Key {
                    key,
                    pressed,
                    repeat,
                    modifiers,
                    ..
                } => {
                    if self.shift_pressed(modifiers.shift) {
                        events.push(InputEvent::Breath);
                    }
                    if *pressed && !*repeat {
                        if let Some(translated) = key_event(*key) {
                            events.push(translated);
                        }
                    }
                }
                egui::Event::PointerButton { modifiers, .. } => {
                    if self.shift_pressed(modifiers.shift) {
                        events.push(InputEvent::Breath);
                    }
                }
                egui::Event::PointerMoved(pos) => {
                    events.push(InputEvent::PointerMoved {
                        x: (pos.x - origin.x) as f64 * pixels_per_point,
                        y: (pos.y - origin.y) as f64 * pixels_per_point,
                    });
                }
                egui::Event::WindowFocused(_) => focus_changed = true,
                _ => {}
            }
        }

        if focus_changed {
            self.shift_down = input.modifiers.shift;
        } else if self.shift_pressed(input.modifiers.shift) {
            events.push(InputEvent::Breath);
        }

        events
    }

    /// True on the up→down transition of Shift.
    fn shift_pressed(&mut self, shift: bool) -> bool {
        let pressed = shift && !self.shift_down;
        self.shift_down = shift;
        pressed
    }
}

fn key_event(key: egui::Key) -> Option<InputEvent> {
    match key {
        egui::Key::Space => Some(InputEvent::TogglePlay),
        egui::Key::Escape => Some(InputEvent::Exit),
        other => letter_for_key(other).map(InputEvent::Letter),
    }
}

/// Output letter for an A-Z key.
pub fn letter_for_key(key: egui::Key) -> Option<OutputLetter> {
    let mut chars = key.name().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => OutputLetter::new(c),
        _ => None,
    }
}
