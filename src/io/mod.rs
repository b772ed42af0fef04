// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O with external collaborators: metadata probe, frame decoding and
//! annotation files.

pub mod annotations;
pub mod media;
pub mod probe;
