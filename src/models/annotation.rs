// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the pointer position in video space, the record
//! written for each breath mark, and the letter that names an output file.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A pointer position in source-video pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i64,
    pub y: i64,
}

/// One breath mark, serialized as a `frame,x,y,breath` CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnnotationRecord {
    pub frame: u64,
    pub x: i64,
    pub y: i64,
    pub breath: u8,
}

impl AnnotationRecord {
    /// Column names, in serialization order.
    pub const HEADER: [&'static str; 4] = ["frame", "x", "y", "breath"];

    pub fn new(frame: u64, position: Position, breath: u8) -> Self {
        Self {
            frame,
            x: position.x,
            y: position.y,
            breath,
        }
    }
}

/// Lowercase ASCII letter selecting the output file `<letter>.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputLetter(char);

impl OutputLetter {
    /// Accepts `a`-`z` in either case.
    pub fn new(c: char) -> Option<Self> {
        c.is_ascii_alphabetic().then(|| Self(c.to_ascii_lowercase()))
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.0)
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

impl fmt::Display for OutputLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}
