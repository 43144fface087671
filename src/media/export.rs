/// Saving enhanced images

use chrono::Local;
use image::{ImageFormat, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::task;

/// Suggested file name for a freshly enhanced image
pub fn default_output_name() -> String {
    format!("sharpify_{}.png", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Save `image` to `path` on a blocking worker
///
/// The format follows the extension; no (or an unknown) extension means PNG.
/// Returns the path actually written.
pub async fn save_image(image: RgbImage, path: PathBuf) -> Result<PathBuf, String> {
    task::spawn_blocking(move || save_image_blocking(&image, path))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

fn save_image_blocking(image: &RgbImage, path: PathBuf) -> Result<PathBuf, String> {
    let (path, format) = match ImageFormat::from_path(&path) {
        Ok(format) if format.can_write() => (path, format),
        _ => (path.with_extension("png"), ImageFormat::Png),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }

    image
        .save_with_format(&path, format)
        .map_err(|e| format!("Failed to save {}: {}", display_name(&path), e))?;

    log::info!("💾 Saved {}x{} image to {}", image.width(), image.height(), path.display());
    Ok(path)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_default_name_is_png() {
        let name = default_output_name();
        assert!(name.starts_with("sharpify_"));
        assert!(name.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_saves_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        let image = RgbImage::from_pixel(4, 4, Rgb([9, 8, 7]));

        let written = save_image(image.clone(), path.clone()).await.unwrap();
        assert_eq!(written, path);
        assert_eq!(image::open(&written).unwrap().to_rgb8(), image);
    }

    #[tokio::test]
    async fn test_missing_extension_becomes_png() {
        let dir = tempfile::tempdir().unwrap();
        let written = save_image(RgbImage::new(2, 2), dir.path().join("result"))
            .await
            .unwrap();
        assert_eq!(written.extension().unwrap(), "png");
        assert!(written.exists());
    }

    #[tokio::test]
    async fn test_jpeg_extension_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        let written = save_image(RgbImage::new(8, 8), dir.path().join("result.jpg"))
            .await
            .unwrap();
        assert_eq!(ImageFormat::from_path(&written).unwrap(), ImageFormat::Jpeg);
        assert!(written.exists());
    }
}
