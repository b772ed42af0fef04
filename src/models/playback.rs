// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback state management.
//!
//! Tracks the current frame, the last pointer position, play/pause, the
//! active output letter and whether the session has exited. Once exited
//! the state refuses every further mutation.

use super::annotation::{AnnotationRecord, OutputLetter, Position};
use thiserror::Error;

/// Breath flag written with every mark.
pub const BREATH: u8 = 1;

/// Why a breath key press did not produce a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BreathRejected {
    #[error("no pointer position recorded yet")]
    NoPosition,
    #[error("no output file selected (press a letter key)")]
    NoOutputFile,
    #[error("no frame has been shown yet")]
    NoFrame,
    #[error("session has exited")]
    Exited,
}

/// Mutable record of the playback session.
#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    frame_index: Option<u64>,
    position: Option<Position>,
    playing: bool,
    exited: bool,
    active_output: Option<OutputLetter>,
    breath: u8,
}

impl PlaybackState {
    /// Start paused with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_index(&self) -> Option<u64> {
        self.frame_index
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    pub fn active_output(&self) -> Option<OutputLetter> {
        self.active_output
    }

    /// Whether a refresh tick should pull the next frame.
    pub fn should_advance(&self) -> bool {
        self.playing && !self.exited
    }

    /// Flip Paused/Playing. Returns the new playing flag, or `None` once exited.
    pub fn toggle_play(&mut self) -> Option<bool> {
        if self.exited {
            return None;
        }
        self.playing = !self.playing;
        Some(self.playing)
    }

    /// Enter the terminal Exited state. Returns true only on the first call.
    pub fn exit(&mut self) -> bool {
        if self.exited {
            return false;
        }
        self.exited = true;
        self.playing = false;
        true
    }

    pub fn set_position(&mut self, position: Position) {
        if !self.exited {
            self.position = Some(position);
        }
    }

    pub fn set_frame(&mut self, index: u64) {
        if !self.exited {
            self.frame_index = Some(index);
        }
    }

    /// Make `letter` the active output. Returns `None` once exited.
    pub fn select_output(&mut self, letter: OutputLetter) -> Option<OutputLetter> {
        if self.exited {
            return None;
        }
        self.active_output = Some(letter);
        Some(letter)
    }

    /// Build the record for a breath key press, with the letter it belongs to.
    pub fn mark_breath(&mut self) -> Result<(OutputLetter, AnnotationRecord), BreathRejected> {
        if self.exited {
            return Err(BreathRejected::Exited);
        }
        self.breath = BREATH;

        let position = self.position.ok_or(BreathRejected::NoPosition)?;
        let letter = self.active_output.ok_or(BreathRejected::NoOutputFile)?;
        let frame = self.frame_index.ok_or(BreathRejected::NoFrame)?;

        Ok((letter, AnnotationRecord::new(frame, position, self.breath)))
    }
}
