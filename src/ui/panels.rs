/// Image preview panels
use iced::widget::image::Handle;
use iced::widget::{column, container, text};
use iced::{Alignment, ContentFit, Element, Length};
use image::{DynamicImage, RgbImage};

use super::theme;
use crate::Message;

/// Height of both preview areas
const PREVIEW_HEIGHT: f32 = 360.0;

/// Convert a decoded image into something iced can draw
pub fn handle_from_dynamic(img: &DynamicImage) -> Handle {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Handle::from_rgba(width, height, rgba.into_raw())
}

pub fn handle_from_rgb(img: &RgbImage) -> Handle {
    Handle::from_rgba(img.width(), img.height(), opaque_rgba(img))
}

fn opaque_rgba(img: &RgbImage) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(img.as_raw().len() / 3 * 4);
    for pixel in img.pixels() {
        rgba.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 255]);
    }
    rgba
}

/// Labelled preview box; shows `placeholder` until there's an image
pub fn image_panel<'a>(
    label: &'a str,
    handle: Option<&Handle>,
    placeholder: &'a str,
) -> Element<'a, Message> {
    let body: Element<'a, Message> = match handle {
        Some(handle) => iced::widget::image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fixed(PREVIEW_HEIGHT))
            .into(),
        None => container(text(placeholder).size(14).color(theme::SECONDARY))
            .width(Length::Fill)
            .height(Length::Fixed(PREVIEW_HEIGHT))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(PREVIEW_HEIGHT))
            .into(),
    };

    container(
        column![text(label).size(16).color(theme::SECONDARY), body]
            .spacing(10)
            .align_x(Alignment::Start),
    )
    .padding(20)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}
