/// Soft lilac palette used by the whole window

use iced::theme::Palette;
use iced::{Color, Theme};

pub const PRIMARY: Color = Color::from_rgb(0x8a as f32 / 255.0, 0x70 as f32 / 255.0, 0x90 as f32 / 255.0);
pub const SECONDARY: Color = Color::from_rgb(0x6b as f32 / 255.0, 0x4e as f32 / 255.0, 0x71 as f32 / 255.0);
pub const BACKGROUND: Color = Color::from_rgb(0xf5 as f32 / 255.0, 0xe6 as f32 / 255.0, 0xf2 as f32 / 255.0);
pub const TEXT: Color = Color::from_rgb(0x4a as f32 / 255.0, 0x4a as f32 / 255.0, 0x4a as f32 / 255.0);

pub fn sharpify() -> Theme {
    Theme::custom(
        "Sharpify".to_string(),
        Palette {
            background: BACKGROUND,
            text: TEXT,
            primary: PRIMARY,
            success: Color::from_rgb(0.30, 0.60, 0.40),
            danger: Color::from_rgb(0.75, 0.30, 0.35),
        },
    )
}
