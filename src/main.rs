// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Breathmark - frame-by-frame breath annotation for videos
//!
//! Plays a video in a desktop window. Letter keys pick an output file
//! `<letter>.csv`, Shift marks a breath at the pointer position on the
//! current frame, Space plays/pauses and Escape quits.

mod app;
mod cli;
mod config;
mod io;
mod models;
mod render;
mod session;
mod ui;
mod util;

use anyhow::{anyhow, bail, Context, Result};
use app::{AnnotatorApp, SessionOutcome};
use cli::Args;
use config::Settings;
use io::annotations::AnnotationBook;
use io::media::FrameSource;
use io::probe::VideoMetadata;
use session::Session;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse_args();
    let settings = Settings::resolve(&args)?;

    let video_path = match args.file_path.clone() {
        Some(path) => path,
        None => pick_video()?,
    };

    let metadata = io::probe::probe(&settings.ffprobe, &video_path)
        .with_context(|| format!("Failed to read metadata from {}", video_path.display()))?;
    println!(
        "Video frame dimensions: width={}, height={}",
        metadata.size.width, metadata.size.height
    );
    log::info!("Frame rate: {:.3} fps", metadata.fps());

    std::fs::create_dir_all(&settings.output_dir).with_context(|| {
        format!("Failed to create output directory {}", settings.output_dir.display())
    })?;

    let source = open_source(&settings, &video_path, &metadata, args.skip)?;
    let (shutdown_tx, shutdown_rx) = channel();
    let session = Session::new(
        &metadata,
        AnnotationBook::new(settings.output_dir.clone()),
        shutdown_tx,
    );
    let outcome: SessionOutcome = Arc::new(Mutex::new(None));

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_maximized(true)
            .with_title("Breath Annotator"),
        ..Default::default()
    };

    // Run the application
    let app_outcome = Arc::clone(&outcome);
    eframe::run_native(
        "Breath Annotator",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(AnnotatorApp::new(
                session,
                source,
                shutdown_rx,
                settings,
                app_outcome,
            )))
        }),
    )
    .map_err(|e| anyhow!("Application error: {}", e))?;

    let failure = outcome
        .lock()
        .map_err(|_| anyhow!("Session outcome lock poisoned"))?
        .take();
    if let Some(message) = failure {
        bail!("Annotation session failed: {}", message);
    }

    Ok(())
}

/// Ask for a video with a native file dialog.
fn pick_video() -> Result<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Videos", &["mp4", "mov", "avi", "mkv", "webm", "m4v"])
        .pick_file()
        .context("No video selected")
}

#[cfg(not(feature = "video-opencv"))]
fn open_source(
    settings: &Settings,
    path: &Path,
    metadata: &VideoMetadata,
    skip: f64,
) -> Result<Box<dyn FrameSource>> {
    let source = io::media::FfmpegFrameSource::open(&settings.ffmpeg, path, metadata, skip)?;
    Ok(Box::new(source))
}

#[cfg(feature = "video-opencv")]
fn open_source(
    _settings: &Settings,
    path: &Path,
    metadata: &VideoMetadata,
    skip: f64,
) -> Result<Box<dyn FrameSource>> {
    let source = io::media::OpenCvFrameSource::open(path, metadata.fps(), skip)?;
    Ok(Box::new(source))
}
