// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Render step: fit a decoded frame to the display.

use crate::io::media::Frame;
use crate::util::geometry::{FrameSize, Scale};
use image::imageops::{self, FilterType};
use image::RgbImage;

/// A frame ready to upload, with the scale it was produced at.
///
/// Pointer positions over this frame must be mapped back with `scale`.
pub struct RenderedFrame {
    pub index: u64,
    pub image: RgbImage,
    pub scale: Scale,
}

impl RenderedFrame {
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.image.width(), self.image.height())
    }
}

/// Resize `frame` by `scale`; frames that already fit are passed through.
pub fn fit_frame(frame: Frame, scale: Scale) -> RenderedFrame {
    let Frame { index, image } = frame;

    let image = if scale.is_identity() {
        image
    } else {
        let target = scale.display_size(FrameSize::new(image.width(), image.height()));
        imageops::resize(&image, target.width, target.height, FilterType::Triangle)
    };

    RenderedFrame { index, image, scale }
}
