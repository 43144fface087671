/// Input normalization before inference
///
/// The x4 upscaler multiplies each side by four, so large inputs are shrunk
/// first to keep accelerator memory in check.

use image::{imageops::FilterType, DynamicImage, RgbImage};

/// Compute the size that fits inside `max_side` while keeping aspect ratio.
///
/// Returns `None` when the image already fits. Otherwise the longer side is
/// exactly `max_side` and the shorter side is rounded down (never below 1).
/// A `max_side` of 0 is treated as 1.
pub fn fit_within(width: u32, height: u32, max_side: u32) -> Option<(u32, u32)> {
    let max_side = max_side.max(1);
    if width <= max_side && height <= max_side {
        return None;
    }

    let scale_short = |short: u32, long: u32| -> u32 {
        let scaled = (short as u64 * max_side as u64) / long as u64;
        (scaled as u32).max(1)
    };

    if width >= height {
        Some((max_side, scale_short(height, width)))
    } else {
        Some((scale_short(width, height), max_side))
    }
}

/// Convert to RGB and downscale with Lanczos3 if either side exceeds `max_side`
pub fn prepare_input(image: &DynamicImage, max_side: u32) -> RgbImage {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    match fit_within(width, height, max_side) {
        Some((new_width, new_height)) => {
            log::info!(
                "📐 Resized image from {}x{} to {}x{}",
                width, height, new_width, new_height
            );
            image::imageops::resize(&rgb, new_width, new_height, FilterType::Lanczos3)
        }
        None => rgb,
    }
}
