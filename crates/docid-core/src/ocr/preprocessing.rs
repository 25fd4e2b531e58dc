//! Image preprocessing for OCR.

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use tracing::debug;

use crate::error::OcrError;

/// Filter applied to the source image before a second OCR pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageFilter {
    /// Keep only the red channel and apply a gamma curve. Red seals and
    /// stamps fade into the background while dark print stays dark.
    RedChannelGamma { gamma: f32 },
}

/// Image preprocessor for the OCR pipeline.
pub struct ImagePreprocessor {
    /// Maximum image dimension.
    max_size: u32,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self { max_size: 2048 }
    }

    /// Set maximum image dimension.
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_size = size;
        self
    }

    /// Shrink the image so its longer side fits `max_size`.
    pub fn limit_size(&self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = image.dimensions();
        let (new_width, new_height) = self.calculate_resize_dimensions(width, height, self.max_size);

        if (new_width, new_height) == (width, height) {
            return image.clone();
        }

        debug!(
            "Resizing image {}x{} -> {}x{}",
            width, height, new_width, new_height
        );
        image.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
    }

    /// Apply a rescan filter.
    pub fn apply(&self, image: &DynamicImage, filter: ImageFilter) -> Result<DynamicImage, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        match filter {
            ImageFilter::RedChannelGamma { gamma } => self.red_channel_gamma(image, gamma),
        }
    }

    /// Red channel mapped through `255 * (p / 255) ^ gamma`.
    pub fn red_channel_gamma(&self, image: &DynamicImage, gamma: f32) -> Result<DynamicImage, OcrError> {
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(OcrError::Preprocessing(format!("invalid gamma {}", gamma)));
        }

        let mut lut = [0u8; 256];
        for (p, slot) in lut.iter_mut().enumerate() {
            let value = 255.0 * (p as f32 / 255.0).powf(gamma);
            *slot = value.round().clamp(0.0, 255.0) as u8;
        }

        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut result = GrayImage::new(width, height);
        for (x, y, pixel) in rgb.enumerate_pixels() {
            result.put_pixel(x, y, Luma([lut[pixel[0] as usize]]));
        }

        Ok(DynamicImage::ImageLuma8(result))
    }

    fn calculate_resize_dimensions(
        &self,
        width: u32,
        height: u32,
        target_size: u32,
    ) -> (u32, u32) {
        let max_dim = width.max(height);

        if max_dim <= target_size || target_size == 0 {
            return (width, height);
        }

        let scale = target_size as f32 / max_dim as f32;
        let new_width = (width as f32 * scale) as u32;
        let new_height = (height as f32 * scale) as u32;

        (new_width.max(1), new_height.max(1))
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}
