/// Decoding user-picked images

use image::DynamicImage;
use std::path::{Path, PathBuf};
use tokio::task;

/// A decoded input image and where it came from
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub image: DynamicImage,
}

/// Load an image file on a blocking worker
///
/// # Returns
/// * `Ok(LoadedImage)` - Decoded image
/// * `Err(String)` - Error message if reading or decoding fails
pub async fn load_image(path: PathBuf) -> Result<LoadedImage, String> {
    task::spawn_blocking(move || load_image_blocking(&path))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

fn load_image_blocking(path: &Path) -> Result<LoadedImage, String> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()));
    }

    let image = image::ImageReader::open(path)
        .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?
        .with_guessed_format()
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?
        .decode()
        .map_err(|e| format!("Failed to decode {}: {}", path.display(), e))?;

    log::info!(
        "📷 Loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );

    Ok(LoadedImage {
        path: path.to_path_buf(),
        image,
    })
}
