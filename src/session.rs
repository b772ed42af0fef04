// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation session: input handling and frame advancement.
//!
//! The session applies [`InputEvent`]s to the [`PlaybackState`], writes
//! breath marks through the [`AnnotationBook`] and pulls frames on refresh
//! ticks. It never touches the window; when the session ends it sends a
//! [`Shutdown`] to whoever owns the window.

use crate::io::annotations::{AnnotationBook, Selection};
use crate::io::media::FrameSource;
use crate::io::probe::VideoMetadata;
use crate::models::annotation::{AnnotationRecord, OutputLetter};
use crate::models::playback::PlaybackState;
use crate::render::{self, RenderedFrame};
use crate::util::geometry::{FrameSize, Scale};
use anyhow::Result;
use std::sync::mpsc::Sender;

/// User input, already translated from window events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Select the output file for this letter.
    Letter(OutputLetter),
    /// Record a breath mark at the current frame and position.
    Breath,
    TogglePlay,
    Exit,
    /// Pointer moved, in physical display pixels relative to the frame's top-left.
    PointerMoved { x: f64, y: f64 },
}

/// Why the session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shutdown {
    Requested,
    Failed(String),
}

pub struct Session {
    state: PlaybackState,
    book: AnnotationBook,
    video: FrameSize,
    fps: f64,
    /// Scale of the frame currently on screen.
    scale: Option<Scale>,
    exhausted: bool,
    last_record: Option<(OutputLetter, AnnotationRecord)>,
    shutdown: Sender<Shutdown>,
}

impl Session {
    pub fn new(metadata: &VideoMetadata, book: AnnotationBook, shutdown: Sender<Shutdown>) -> Self {
        Self {
            state: PlaybackState::new(),
            book,
            video: metadata.size,
            fps: metadata.fps(),
            scale: None,
            exhausted: false,
            last_record: None,
            shutdown,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn last_record(&self) -> Option<(OutputLetter, AnnotationRecord)> {
        self.last_record
    }

    /// Apply one input event.
    pub fn handle(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::PointerMoved { x, y } => {
                let scale = self.scale.unwrap_or(Scale::IDENTITY);
                self.state.set_position(scale.to_video(x, y));
            }
            InputEvent::Letter(letter) => {
                if self.state.select_output(letter).is_some() {
                    let path = self.book.path_for(letter);
                    match self.book.select(letter)? {
                        Selection::Created => {
                            log::info!("Created new output file: {}", path.display())
                        }
                        Selection::Existing => {
                            log::info!("Switched to existing output file: {}", path.display())
                        }
                        Selection::AlreadyOpen => {
                            log::info!("Switched to output file: {}", path.display())
                        }
                    }
                }
            }
            InputEvent::Breath => match self.state.mark_breath() {
                Ok((letter, record)) => {
                    self.book.append(letter, &record)?;
                    log::debug!(
                        "Saved frame {}: x={}, y={}, breath={} to {}",
                        record.frame,
                        record.x,
                        record.y,
                        record.breath,
                        letter
                    );
                    self.last_record = Some((letter, record));
                }
                Err(reason) => log::warn!("Breath mark ignored: {}", reason),
            },
            InputEvent::TogglePlay => {
                if let Some(playing) = self.state.toggle_play() {
                    log::info!("{}", if playing { "Playing" } else { "Paused" });
                }
            }
            InputEvent::Exit => {
                if self.state.exit() {
                    log::info!("Exit requested, closing {} output file(s)", self.book.open_count());
                    self.book.close()?;
                    let _ = self.shutdown.send(Shutdown::Requested);
                }
            }
        }
        Ok(())
    }

    /// Refresh tick: advance one frame while playing.
    pub fn tick(
        &mut self,
        source: &mut dyn FrameSource,
        display_width: f64,
        display_height: f64,
    ) -> Result<Option<RenderedFrame>> {
        if !self.state.should_advance() {
            return Ok(None);
        }
        self.advance(source, display_width, display_height)
    }

    /// Show the first frame before playback starts.
    pub fn prime(
        &mut self,
        source: &mut dyn FrameSource,
        display_width: f64,
        display_height: f64,
    ) -> Result<Option<RenderedFrame>> {
        if self.state.is_exited() || self.state.frame_index().is_some() {
            return Ok(None);
        }
        self.advance(source, display_width, display_height)
    }

    fn advance(
        &mut self,
        source: &mut dyn FrameSource,
        display_width: f64,
        display_height: f64,
    ) -> Result<Option<RenderedFrame>> {
        if self.exhausted {
            return Ok(None);
        }
        let Some(scale) = Scale::fit(self.video, display_width, display_height) else {
            return Ok(None);
        };

        let Some(frame) = source.next_frame()? else {
            self.exhausted = true;
            log::info!("End of video reached");
            return Ok(None);
        };

        if self.scale != Some(scale) {
            log::debug!("Display scale {:.4}", scale.factor());
        }
        let rendered = render::fit_frame(frame, scale);
        self.state.set_frame(rendered.index);
        self.scale = Some(rendered.scale);
        Ok(Some(rendered))
    }

    /// End the session after an unrecoverable error.
    pub fn fail(&mut self, error: anyhow::Error) {
        log::error!("Session failed: {:#}", error);
        self.state.exit();
        if let Err(e) = self.book.close() {
            log::error!("Failed to close output files: {:#}", e);
        }
        let _ = self.shutdown.send(Shutdown::Failed(format!("{:#}", error)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::media::MemoryFrameSource;
    use crate::models::annotation::Position;
    use std::path::Path;
    use std::sync::mpsc::{channel, Receiver};

    fn metadata(width: u32, height: u32) -> VideoMetadata {
        VideoMetadata {
            frame_rate: "30/1".parse().unwrap(),
            size: FrameSize::new(width, height),
        }
    }

    fn session(dir: &Path, width: u32, height: u32) -> (Session, Receiver<Shutdown>) {
        let (tx, rx) = channel();
        let session = Session::new(&metadata(width, height), AnnotationBook::new(dir), tx);
        (session, rx)
    }

    fn letter(c: char) -> InputEvent {
        InputEvent::Letter(OutputLetter::new(c).unwrap())
    }

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn test_letter_creates_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session(dir.path(), 64, 48);

        session.handle(letter('A')).unwrap();
        assert_eq!(read(dir.path(), "a.csv"), "frame,x,y,breath\n");
    }

    #[test]
    fn test_breath_goes_to_selected_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session(dir.path(), 64, 48);
        let mut source = MemoryFrameSource::solid(FrameSize::new(64, 48), 100, 20);

        session.prime(&mut source, 1920.0, 1080.0).unwrap().unwrap();
        session.handle(InputEvent::PointerMoved { x: 12.0, y: 34.0 }).unwrap();
        session.handle(letter('a')).unwrap();
        session.handle(InputEvent::Breath).unwrap();
        assert_eq!(read(dir.path(), "a.csv"), "frame,x,y,breath\n100,12,34,1\n");

        // Advance to frame 110.
        session.handle(InputEvent::TogglePlay).unwrap();
        for _ in 0..10 {
            session.tick(&mut source, 1920.0, 1080.0).unwrap().unwrap();
        }
        assert_eq!(session.state().frame_index(), Some(110));

        session.handle(letter('b')).unwrap();
        session.handle(InputEvent::Breath).unwrap();
        assert_eq!(read(dir.path(), "b.csv"), "frame,x,y,breath\n110,12,34,1\n");
        assert_eq!(read(dir.path(), "a.csv"), "frame,x,y,breath\n100,12,34,1\n");
        assert_eq!(
            session.last_record(),
            Some((
                OutputLetter::new('b').unwrap(),
                AnnotationRecord { frame: 110, x: 12, y: 34, breath: 1 }
            ))
        );
    }

    #[test]
    fn test_pointer_mapped_with_rendered_scale() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session(dir.path(), 1920, 1080);
        let mut source = MemoryFrameSource::solid(FrameSize::new(1920, 1080), 0, 1);

        let rendered = session.prime(&mut source, 960.0, 1080.0).unwrap().unwrap();
        assert_eq!(rendered.size(), FrameSize::new(960, 540));

        session.handle(InputEvent::PointerMoved { x: 6.0, y: 17.0 }).unwrap();
        assert_eq!(session.state().position(), Some(Position { x: 12, y: 34 }));
    }

    #[test]
    fn test_pointer_follows_scale_of_frame_on_screen() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session(dir.path(), 1920, 1080);
        let mut source = MemoryFrameSource::solid(FrameSize::new(1920, 1080), 0, 2);

        let first = session.prime(&mut source, 960.0, 1080.0).unwrap().unwrap();

        // Window grows while paused; the half-size frame is still shown.
        assert!(session.tick(&mut source, 1920.0, 1080.0).unwrap().is_none());
        session.handle(InputEvent::PointerMoved { x: 100.0, y: 50.0 }).unwrap();
        assert_eq!(session.state().position(), Some(first.scale.to_video(100.0, 50.0)));
        assert_eq!(session.state().position(), Some(Position { x: 200, y: 100 }));

        session.handle(InputEvent::TogglePlay).unwrap();
        let second = session.tick(&mut source, 1920.0, 1080.0).unwrap().unwrap();
        assert!(second.scale.is_identity());
        session.handle(InputEvent::PointerMoved { x: 100.0, y: 50.0 }).unwrap();
        assert_eq!(session.state().position(), Some(Position { x: 100, y: 50 }));
    }

    #[test]
    fn test_breath_without_selection_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session(dir.path(), 64, 48);
        let mut source = MemoryFrameSource::solid(FrameSize::new(64, 48), 0, 1);
        session.prime(&mut source, 640.0, 480.0).unwrap();

        session.handle(InputEvent::Breath).unwrap();
        session.handle(InputEvent::PointerMoved { x: 1.0, y: 1.0 }).unwrap();
        session.handle(InputEvent::Breath).unwrap();
        assert!(session.last_record().is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_paused_tick_does_not_advance() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session(dir.path(), 64, 48);
        let mut source = MemoryFrameSource::solid(FrameSize::new(64, 48), 0, 5);

        session.prime(&mut source, 640.0, 480.0).unwrap();
        assert!(session.tick(&mut source, 640.0, 480.0).unwrap().is_none());
        assert_eq!(session.state().frame_index(), Some(0));

        // Priming only happens once.
        assert!(session.prime(&mut source, 640.0, 480.0).unwrap().is_none());
    }

    #[test]
    fn test_exhausted_source_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session(dir.path(), 64, 48);
        let mut source = MemoryFrameSource::solid(FrameSize::new(64, 48), 0, 2);

        session.prime(&mut source, 640.0, 480.0).unwrap();
        session.handle(InputEvent::TogglePlay).unwrap();
        assert!(session.tick(&mut source, 640.0, 480.0).unwrap().is_some());
        assert!(session.tick(&mut source, 640.0, 480.0).unwrap().is_none());
        assert!(session.tick(&mut source, 640.0, 480.0).unwrap().is_none());
        assert!(session.is_exhausted());
        assert_eq!(session.state().frame_index(), Some(1));
    }

    #[test]
    fn test_zero_display_skips_pull() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _rx) = session(dir.path(), 64, 48);
        let mut source = MemoryFrameSource::solid(FrameSize::new(64, 48), 0, 1);

        assert!(session.prime(&mut source, 0.0, 0.0).unwrap().is_none());
        assert!(session.prime(&mut source, 64.0, 48.0).unwrap().is_some());
    }

    #[test]
    fn test_exit_is_terminal_and_signals_once() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, rx) = session(dir.path(), 64, 48);
        let mut source = MemoryFrameSource::solid(FrameSize::new(64, 48), 0, 5);

        session.prime(&mut source, 640.0, 480.0).unwrap();
        session.handle(letter('a')).unwrap();
        session.handle(InputEvent::PointerMoved { x: 3.0, y: 4.0 }).unwrap();
        session.handle(InputEvent::Exit).unwrap();
        assert_eq!(rx.try_recv(), Ok(Shutdown::Requested));

        session.handle(InputEvent::Breath).unwrap();
        session.handle(letter('b')).unwrap();
        session.handle(InputEvent::TogglePlay).unwrap();
        session.handle(InputEvent::Exit).unwrap();
        assert!(session.tick(&mut source, 640.0, 480.0).unwrap().is_none());

        assert!(rx.try_recv().is_err());
        assert!(session.last_record().is_none());
        assert_eq!(read(dir.path(), "a.csv"), "frame,x,y,breath\n");
        assert!(!dir.path().join("b.csv").exists());
    }

    #[test]
    fn test_fail_signals_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, rx) = session(dir.path(), 64, 48);

        session.fail(anyhow::anyhow!("disk full"));
        assert!(session.state().is_exited());
        assert_eq!(rx.try_recv(), Ok(Shutdown::Failed("disk full".to_string())));
    }
}
