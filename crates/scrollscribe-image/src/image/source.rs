// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source image: the decoded screenshot a transcription works on. Immutable
// once loaded; workers share it behind an `Arc` and only ever read regions.

use image::DynamicImage;
use scrollscribe_core::{MIN_SOURCE_HEIGHT, Result, ScribeError};
use tracing::{debug, info, instrument};

/// Decoded screenshot plus its pixel dimensions.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
}

impl SourceImage {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let image = image::open(path.as_ref()).map_err(|err| {
            ScribeError::ImageDecode(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(
            width = image.width(),
            height = image.height(),
            "Screenshot loaded"
        );
        Ok(Self { image })
    }

    /// Decode a screenshot from encoded bytes (PNG, JPEG, WebP, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data).map_err(|err| {
            ScribeError::ImageDecode(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Screenshot decoded from bytes"
        );
        Ok(Self { image })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Reject screenshots too short to be worth splitting or recognising.
    pub fn ensure_min_height(&self) -> Result<()> {
        if self.height() < MIN_SOURCE_HEIGHT {
            return Err(ScribeError::ImageTooSmall {
                height: self.height(),
                minimum: MIN_SOURCE_HEIGHT,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    #[test]
    fn from_bytes_reads_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 300, Rgb([255, 255, 255])));
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let source = SourceImage::from_bytes(&png).unwrap();
        assert_eq!(source.width(), 40);
        assert_eq!(source.height(), 300);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = SourceImage::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ScribeError::ImageDecode(_)));
    }

    #[test]
    fn short_images_rejected() {
        let source = SourceImage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::new(500, 99)));
        assert!(matches!(
            source.ensure_min_height(),
            Err(ScribeError::ImageTooSmall { height: 99, minimum: 100 })
        ));

        let source = SourceImage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::new(500, 100)));
        assert!(source.ensure_min_height().is_ok());
    }

    #[test]
    fn open_missing_file_fails() {
        assert!(SourceImage::open("/nonexistent/screenshot.png").is_err());
    }
}
