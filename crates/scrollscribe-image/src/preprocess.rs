// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Band preprocessing: turns one band of the screenshot into a clean
// black-and-white buffer for OCR.
//
// Stage order matters; each stage reads the previous stage's output:
//
// 1. Extract the band rows at full width
// 2. Resize to the working width (Lanczos3)
// 3. Grayscale
// 4. Linear contrast/brightness transform
// 5. Unsharp mask
// 6. Fixed-threshold binarization
// 7. Median filter
//
// Every function here is pure, so bands can be processed concurrently.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Luma};
use imageproc::filter::{gaussian_blur_f32, median_filter};
use scrollscribe_core::{ChunkDescriptor, PreprocessConfig, Result, ScribeError};
use tracing::{debug, instrument};

use crate::image::SourceImage;

/// Detail magnitude (in gray levels) separating "flat" from "jagged" areas
/// in the unsharp mask.
const FLAT_DETAIL_CUTOFF: f32 = 2.0;

/// Binarized band ready for recognition.
///
/// Kept as a raw `GrayImage`; only lossless encodings are produced from it.
#[derive(Debug, Clone)]
pub struct PreprocessedBuffer {
    index: usize,
    image: GrayImage,
}

impl PreprocessedBuffer {
    pub fn new(index: usize, image: GrayImage) -> Self {
        Self { index, image }
    }

    /// Index of the band this buffer was derived from.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }

    /// Encode as PNG.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|err| ScribeError::ImagePreprocessing {
                index: self.index,
                reason: format!("PNG encoding failed: {}", err),
            })?;
        Ok(buffer)
    }
}

/// Run the full preprocessing pipeline for one band.
///
/// Failures are deterministic for a given input and are reported as
/// [`ScribeError::ImagePreprocessing`] carrying the band index.
#[instrument(skip(source, config), fields(
    index = descriptor.index,
    top = descriptor.top,
    height = descriptor.height,
))]
pub fn preprocess(
    source: &SourceImage,
    descriptor: &ChunkDescriptor,
    config: &PreprocessConfig,
) -> Result<PreprocessedBuffer> {
    let region = extract_region(source, descriptor)?;
    let resized = resize_to_width(region, config.resize_width, descriptor.index)?;
    let gray = resized.to_luma8();
    let boosted = linear_transform(&gray, config.contrast_multiplier, config.brightness_offset);
    let sharpened = unsharp_mask(
        &boosted,
        config.sharpen_sigma,
        config.sharpen_flat_amount,
        config.sharpen_jagged_amount,
    );
    let binary = binarize(&sharpened, config.threshold_value);
    let denoised = if config.median_radius > 0 {
        median_filter(&binary, config.median_radius, config.median_radius)
    } else {
        binary
    };

    debug!(
        width = denoised.width(),
        height = denoised.height(),
        "Band preprocessed"
    );
    Ok(PreprocessedBuffer::new(descriptor.index, denoised))
}

/// Copy the band's rows out of the source at full width.
fn extract_region(source: &SourceImage, descriptor: &ChunkDescriptor) -> Result<DynamicImage> {
    let fail = |reason: String| ScribeError::ImagePreprocessing {
        index: descriptor.index,
        reason,
    };

    if source.width() == 0 {
        return Err(fail("source image has zero width".into()));
    }
    if descriptor.height == 0 {
        return Err(fail("band has zero height".into()));
    }
    let bottom = descriptor
        .top
        .checked_add(descriptor.height)
        .ok_or_else(|| fail("band bounds overflow".into()))?;
    if bottom > source.height() {
        return Err(fail(format!(
            "band [{}, {}) exceeds image height {}",
            descriptor.top,
            bottom,
            source.height()
        )));
    }

    Ok(source
        .as_dynamic()
        .crop_imm(0, descriptor.top, source.width(), descriptor.height))
}

/// Scale to `target_width`, preserving aspect ratio.
fn resize_to_width(region: DynamicImage, target_width: u32, index: usize) -> Result<DynamicImage> {
    if target_width == 0 {
        return Err(ScribeError::ImagePreprocessing {
            index,
            reason: "resize width is zero".into(),
        });
    }
    if region.width() == target_width {
        return Ok(region);
    }

    let scaled_height =
        (region.height() as u64 * target_width as u64 + region.width() as u64 / 2) / region.width() as u64;
    let target_height = u32::try_from(scaled_height.max(1)).map_err(|_| {
        ScribeError::ImagePreprocessing {
            index,
            reason: format!("resized height {} does not fit in u32", scaled_height),
        }
    })?;

    Ok(region.resize_exact(target_width, target_height, FilterType::Lanczos3))
}

/// `p' = clamp(p * multiplier + offset)` on the [0,1] intensity scale.
pub fn linear_transform(image: &GrayImage, multiplier: f32, offset: f32) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y).0[0] as f32 / 255.0;
        let v = (p * multiplier + offset).clamp(0.0, 1.0);
        Luma([(v * 255.0).round() as u8])
    })
}

/// Unsharp mask with separate amounts for flat and jagged areas.
///
/// `detail = p - gaussian_blur(p)`; the output is `p + amount * detail`,
/// where `amount` is `flat_amount` when `|detail|` is within
/// [`FLAT_DETAIL_CUTOFF`] and `jagged_amount` otherwise.
pub fn unsharp_mask(image: &GrayImage, sigma: f32, flat_amount: f32, jagged_amount: f32) -> GrayImage {
    // Blur in f32 so `detail` is not skewed by u8 quantisation.
    let levels: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
            Luma([image.get_pixel(x, y).0[0] as f32])
        });
    let blurred = gaussian_blur_f32(&levels, sigma);

    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let original = levels.get_pixel(x, y).0[0];
        let detail = original - blurred.get_pixel(x, y).0[0];
        let amount = if detail.abs() <= FLAT_DETAIL_CUTOFF {
            flat_amount
        } else {
            jagged_amount
        };
        Luma([(original + amount * detail).round().clamp(0.0, 255.0) as u8])
    })
}

/// Pixels at or above `threshold` become white, the rest black.
pub fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut output = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let binary = if pixel.0[0] >= threshold { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([binary]));
    }

    output
}
