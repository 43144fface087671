use iced::widget::image::Handle;
use iced::widget::{button, column, container, row, text, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use image::{DynamicImage, RgbImage};
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod media;
mod ui;
mod upscaler;

use config::Settings;
use media::loader::LoadedImage;
use upscaler::remote::RemotePipeline;
use upscaler::{UpscaleOutcome, Upscaler};

const TAGLINE: &str = "Enhance Your Moments with Ritika and Lata";

/// Main application state
struct Sharpify {
    settings: Settings,
    /// Loaded model; `None` until the background load finishes (or if it failed)
    upscaler: Option<Arc<Upscaler>>,
    input: Option<LoadedImage>,
    input_handle: Option<Handle>,
    output: Option<RgbImage>,
    output_handle: Option<Handle>,
    /// Status line under the result
    status: String,
    /// An upscale call is in flight
    busy: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Background model load finished
    ModelLoaded(Result<Arc<Upscaler>, String>),
    /// User clicked "Upload Image"
    PickImage,
    /// Picked file decoded (or not)
    ImageLoaded(Result<LoadedImage, String>),
    /// User clicked "Enhance Image"
    Enhance,
    /// Upscale call returned
    EnhanceComplete(UpscaleOutcome),
    /// User clicked "Save Image"
    SaveResult,
    /// Save finished with the written path
    Saved(Result<PathBuf, String>),
}

impl Sharpify {
    /// Create the window state and start loading the model
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        log::info!("🎨 Sharpify starting, model server at {}", settings.endpoint);

        let load = Task::perform(load_model(settings.clone()), Message::ModelLoaded);
        (Self::with_settings(settings), load)
    }

    fn with_settings(settings: Settings) -> Self {
        Sharpify {
            settings,
            upscaler: None,
            input: None,
            input_handle: None,
            output: None,
            output_handle: None,
            status: "Loading model... This might take a few minutes.".to_string(),
            busy: false,
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ModelLoaded(Ok(upscaler)) => {
                log::info!("✅ Model loaded successfully on {}", upscaler.device());
                self.upscaler = Some(upscaler);
                self.status = "Ready".to_string();
                Task::none()
            }
            Message::ModelLoaded(Err(e)) => {
                log::error!("❌ Model failed to load: {}", e);
                self.status = format!("Model unavailable: {}", e);
                Task::none()
            }
            Message::PickImage => {
                // Native dialog, blocks the UI thread until closed
                let picked = FileDialog::new()
                    .set_title("Select an image to enhance")
                    .add_filter("Images", &media::SUPPORTED_EXTENSIONS)
                    .pick_file();

                match picked {
                    Some(path) => {
                        self.status = format!("Loading {}...", path.display());
                        Task::perform(media::loader::load_image(path), Message::ImageLoaded)
                    }
                    None => Task::none(),
                }
            }
            Message::ImageLoaded(Ok(loaded)) => {
                self.input_handle = Some(ui::panels::handle_from_dynamic(&loaded.image));
                let name = loaded
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.status = format!(
                    "Loaded {} ({}x{}). Ready to enhance.",
                    name,
                    loaded.image.width(),
                    loaded.image.height()
                );
                self.input = Some(loaded);
                Task::none()
            }
            Message::ImageLoaded(Err(e)) => {
                self.status = e;
                Task::none()
            }
            Message::Enhance => {
                // One call at a time; the button is disabled meanwhile
                if self.busy {
                    return Task::none();
                }
                let Some(upscaler) = self.upscaler.clone() else {
                    return Task::none();
                };

                self.busy = true;
                self.status = "Processing...".to_string();
                let image = self.input.as_ref().map(|loaded| loaded.image.clone());
                Task::perform(run_upscale(upscaler, image), Message::EnhanceComplete)
            }
            Message::EnhanceComplete(outcome) => {
                self.busy = false;
                self.output_handle = outcome.image.as_ref().map(ui::panels::handle_from_rgb);
                self.output = outcome.image;
                self.status = outcome.status;
                Task::none()
            }
            Message::SaveResult => {
                let Some(image) = self.output.clone() else {
                    return Task::none();
                };

                // The dialog falls back to its own default if this fails
                if let Err(e) = std::fs::create_dir_all(&self.settings.output_dir) {
                    log::debug!("Could not create {}: {}", self.settings.output_dir.display(), e);
                }
                let target = FileDialog::new()
                    .set_title("Save enhanced image")
                    .set_directory(&self.settings.output_dir)
                    .set_file_name(media::export::default_output_name())
                    .add_filter("PNG", &["png"])
                    .add_filter("JPEG", &["jpg", "jpeg"])
                    .save_file();

                match target {
                    Some(path) => Task::perform(media::export::save_image(image, path), Message::Saved),
                    None => Task::none(),
                }
            }
            Message::Saved(Ok(path)) => {
                self.status = format!("Saved to {}", path.display());
                Task::none()
            }
            Message::Saved(Err(e)) => {
                self.status = e;
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = column![
            text("Sharpify").size(48).color(ui::theme::SECONDARY),
            text(TAGLINE).size(18).color(ui::theme::PRIMARY),
        ]
        .spacing(4)
        .align_x(Alignment::Center);

        let can_enhance = self.upscaler.is_some() && !self.busy;
        let enhance_label = if self.busy { "Processing..." } else { "Enhance Image" };

        let input_column: Column<Message> = column![
            ui::panels::image_panel("Upload Image", self.input_handle.as_ref(), "No image selected"),
            row![
                button("Upload Image")
                    .on_press(Message::PickImage)
                    .style(button::secondary)
                    .padding(12),
                button(enhance_label)
                    .on_press_maybe(can_enhance.then_some(Message::Enhance))
                    .style(button::primary)
                    .padding(12),
            ]
            .spacing(12),
        ]
        .spacing(16)
        .width(Length::FillPortion(1));

        let output_column: Column<Message> = column![
            ui::panels::image_panel("Enhanced Image", self.output_handle.as_ref(), "Nothing enhanced yet"),
            container(text(&self.status).size(16))
                .padding(12)
                .width(Length::Fill)
                .style(container::rounded_box),
            button("Save Image")
                .on_press_maybe(self.output.is_some().then_some(Message::SaveResult))
                .style(button::secondary)
                .padding(12),
        ]
        .spacing(16)
        .width(Length::FillPortion(1));

        let content = column![header, row![input_column, output_column].spacing(24)]
            .spacing(24)
            .padding(32)
            .max_width(1200.0);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        ui::theme::sharpify()
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application("Sharpify", Sharpify::update, Sharpify::view)
        .theme(Sharpify::theme)
        .window_size((1100.0, 780.0))
        .centered()
        .run_with(Sharpify::new)
}

/// Connect to the model server and build the upscaler
/// Runs in a background thread; the health check blocks
async fn load_model(settings: Settings) -> Result<Arc<Upscaler>, String> {
    tokio::task::spawn_blocking(move || {
        let pipeline = RemotePipeline::connect(&settings).map_err(|e| e.to_string())?;
        Ok(Arc::new(Upscaler::new(
            Box::new(pipeline),
            settings.max_side,
            settings.inference_params(),
        )))
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
}

/// Run one upscale call on a blocking worker
async fn run_upscale(upscaler: Arc<Upscaler>, image: Option<DynamicImage>) -> UpscaleOutcome {
    tokio::task::spawn_blocking(move || upscaler.upscale(image.as_ref()))
        .await
        .unwrap_or_else(|e| UpscaleOutcome {
            image: None,
            status: format!("Error during upscaling: {}", e),
        })
}
