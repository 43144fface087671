/// Window building blocks
///
/// - `theme.rs` - Fixed light palette
/// - `panels.rs` - Image preview panels and conversions

pub mod theme;
pub mod panels;
