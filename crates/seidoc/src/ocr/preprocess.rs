//! Raster cleanup before recognition: grayscale, contrast, binarization, median filter.

use super::types::ImagePreprocessingConfig;
use image::{DynamicImage, GrayImage};
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::filter::median_filter;

pub fn preprocess_page(page: &DynamicImage, config: &ImagePreprocessingConfig) -> GrayImage {
    let mut gray = page.to_luma8();
    enhance_contrast(&mut gray, config.contrast);
    let binary = threshold(&gray, config.binarize_threshold, ThresholdType::Binary);
    if config.median_radius > 0 {
        median_filter(&binary, config.median_radius, config.median_radius)
    } else {
        binary
    }
}

/// Scale each pixel's distance from the mean luminance by `factor`.
pub fn enhance_contrast(image: &mut GrayImage, factor: f32) {
    let pixel_count = u64::from(image.width()) * u64::from(image.height());
    if pixel_count == 0 || (factor - 1.0).abs() < f32::EPSILON {
        return;
    }

    let total: u64 = image.pixels().map(|p| u64::from(p.0[0])).sum();
    let mean = (total as f64 / pixel_count as f64).round() as f32;

    for pixel in image.pixels_mut() {
        let value = mean + factor * (f32::from(pixel.0[0]) - mean);
        pixel.0[0] = value.round().clamp(0.0, 255.0) as u8;
    }
}
