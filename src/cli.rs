// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the video (a file dialog opens when omitted)
    pub file_path: Option<PathBuf>,

    /// Seconds to skip at the beginning of the video
    #[arg(long, default_value_t = 0.0)]
    pub skip: f64,

    /// Directory for the per-letter CSV files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// YAML settings file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["breathmark", "clip.mp4"]).unwrap();
        assert_eq!(args.file_path, Some(PathBuf::from("clip.mp4")));
        assert_eq!(args.skip, 0.0);
        assert!(args.output_dir.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_all_options() {
        let args = Args::try_parse_from([
            "breathmark",
            "clip.mp4",
            "--skip",
            "12.5",
            "--output-dir",
            "marks",
            "--config",
            "settings.yaml",
        ])
        .unwrap();
        assert_eq!(args.skip, 12.5);
        assert_eq!(args.output_dir, Some(PathBuf::from("marks")));
        assert_eq!(args.config, Some(PathBuf::from("settings.yaml")));
    }

    #[test]
    fn test_path_is_optional() {
        let args = Args::try_parse_from(["breathmark"]).unwrap();
        assert!(args.file_path.is_none());
    }

    #[test]
    fn test_rejects_bad_skip() {
        assert!(Args::try_parse_from(["breathmark", "clip.mp4", "--skip", "soon"]).is_err());
    }
}
