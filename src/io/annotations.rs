// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-letter CSV output.
//!
//! Each output letter owns one `<letter>.csv` writer, opened lazily the first
//! time the letter is selected and kept open until [`AnnotationBook::close`].
//! Files are opened for append and never truncated; a header row is written
//! only when the file is new or empty.

use crate::models::annotation::{AnnotationRecord, OutputLetter};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;

/// What selecting a letter did on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The file did not exist (or was empty); a header was written.
    Created,
    /// An existing file was opened for append.
    Existing,
    /// The writer was already open this session.
    AlreadyOpen,
}

/// Letter → CSV writer mapping for one session.
pub struct AnnotationBook {
    dir: PathBuf,
    writers: BTreeMap<OutputLetter, csv::Writer<File>>,
}

impl AnnotationBook {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            writers: BTreeMap::new(),
        }
    }

    pub fn path_for(&self, letter: OutputLetter) -> PathBuf {
        letter.path_in(&self.dir)
    }

    /// Open the writer for `letter` if it is not open yet.
    pub fn select(&mut self, letter: OutputLetter) -> Result<Selection> {
        if self.writers.contains_key(&letter) {
            return Ok(Selection::AlreadyOpen);
        }

        let path = self.path_for(letter);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open output file {}", path.display()))?;
        let is_empty = file
            .metadata()
            .with_context(|| format!("Failed to stat output file {}", path.display()))?
            .len()
            == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        let selection = if is_empty {
            writer.write_record(AnnotationRecord::HEADER)?;
            writer
                .flush()
                .with_context(|| format!("Failed to write header to {}", path.display()))?;
            Selection::Created
        } else {
            Selection::Existing
        };

        self.writers.insert(letter, writer);
        Ok(selection)
    }

    /// Append one record to the file for `letter`, opening it if needed.
    pub fn append(&mut self, letter: OutputLetter, record: &AnnotationRecord) -> Result<()> {
        if !self.writers.contains_key(&letter) {
            self.select(letter)?;
        }
        let path = self.path_for(letter);
        let writer = self
            .writers
            .get_mut(&letter)
            .with_context(|| format!("No writer open for {}", path.display()))?;

        writer
            .serialize(record)
            .with_context(|| format!("Failed to write record to {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;
        Ok(())
    }

    pub fn open_count(&self) -> usize {
        self.writers.len()
    }

    /// Flush and drop every writer.
    pub fn close(&mut self) -> Result<()> {
        for (letter, mut writer) in std::mem::take(&mut self.writers) {
            writer
                .flush()
                .with_context(|| format!("Failed to flush {}", letter))?;
        }
        Ok(())
    }
}

impl Drop for AnnotationBook {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("Failed to close output files: {:#}", e);
        }
    }
}
