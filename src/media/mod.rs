/// Image files on disk
///
/// This module handles:
/// - Decoding the image the user picked
/// - Writing the enhanced result back out
///
/// Both run on tokio's blocking pool so the window stays responsive.

pub mod loader;
pub mod export;

/// Extensions offered by the file pickers
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "webp", "bmp", "tiff"];
