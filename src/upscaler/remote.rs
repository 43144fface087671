/// Pretrained pipeline hosted by a diffusers inference server
///
/// Protocol (JSON over HTTP):
/// - `GET  /health`      -> `{"device": "cuda", "model": "stabilityai/..."}`
/// - `POST /upscale`     -> `{"image": "<base64 png>"}`
/// - `POST /empty_cache` -> any 2xx
///
/// Errors come back as a non-2xx status with `{"error": "..."}` or plain text.
///
/// Uses the blocking reqwest client; every call must happen on a blocking
/// worker (`tokio::task::spawn_blocking`), never on the UI thread.

use base64::Engine as _;
use image::{DynamicImage, ImageFormat, RgbImage};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::time::Duration;

use super::pipeline::{Device, PipelineError, UpscalePipeline, UpscaleRequest};
use crate::config::Settings;

#[derive(Deserialize, Debug)]
struct HealthResponse {
    device: Device,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Serialize)]
struct UpscaleBody<'a> {
    model: &'a str,
    prompt: &'a str,
    image: String,
    num_inference_steps: u32,
    guidance_scale: f32,
    seed: u64,
    device: Device,
}

#[derive(Deserialize)]
struct UpscaleResponse {
    image: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for one model server with one loaded pipeline
pub struct RemotePipeline {
    client: Client,
    endpoint: String,
    model_id: String,
    device: Device,
}

impl RemotePipeline {
    /// Connect to the server and select the device.
    ///
    /// Blocks on the health check; call from a blocking worker.
    pub fn connect(settings: &Settings) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let endpoint = settings.endpoint.trim_end_matches('/').to_string();

        log::info!("⏳ Loading model {} from {}...", settings.model_id, endpoint);

        let response = client.get(format!("{}/health", endpoint)).send()?;
        let response = check_status(response)?;
        let health: HealthResponse = response
            .json()
            .map_err(|e| PipelineError::Protocol(format!("bad health response: {}", e)))?;

        if let Some(model) = health.model.as_deref() {
            if model != settings.model_id {
                log::warn!(
                    "⚠️  Server has {} loaded, expected {}",
                    model, settings.model_id
                );
            }
        }

        let device = settings.device.resolve(health.device);
        log::info!("✅ Model ready (server device: {}, using: {})", health.device, device);

        Ok(Self {
            client,
            endpoint,
            model_id: settings.model_id.clone(),
            device,
        })
    }
}

impl UpscalePipeline for RemotePipeline {
    fn device(&self) -> Device {
        self.device
    }

    fn run(&self, request: &UpscaleRequest) -> Result<RgbImage, PipelineError> {
        let body = UpscaleBody {
            model: &self.model_id,
            prompt: &request.prompt,
            image: encode_png_base64(&request.image)?,
            num_inference_steps: request.num_inference_steps,
            guidance_scale: request.guidance_scale,
            seed: request.seed,
            device: self.device,
        };

        let response = self
            .client
            .post(format!("{}/upscale", self.endpoint))
            .json(&body)
            .send()?;
        let response = check_status(response)?;
        let payload: UpscaleResponse = response
            .json()
            .map_err(|e| PipelineError::Protocol(format!("bad upscale response: {}", e)))?;

        decode_png_base64(&payload.image)
    }

    fn empty_cache(&self) -> Result<(), PipelineError> {
        let response = self
            .client
            .post(format!("{}/empty_cache", self.endpoint))
            .send()?;
        check_status(response)?;
        Ok(())
    }
}

/// Pass 2xx responses through, classify everything else
fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, PipelineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(classify_failure(status, &body))
}

/// Turn an error response into a [`PipelineError`]
fn classify_failure(status: StatusCode, body: &str) -> PipelineError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string());
    let message = if message.is_empty() {
        status.to_string()
    } else {
        message
    };

    if status == StatusCode::INSUFFICIENT_STORAGE || is_out_of_memory(&message) {
        PipelineError::OutOfMemory(message)
    } else if status.is_server_error() {
        PipelineError::Runtime(message)
    } else {
        PipelineError::Protocol(format!("{}: {}", status, message))
    }
}

fn is_out_of_memory(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("out of memory") || lower.contains("outofmemoryerror")
}

fn encode_png_base64(image: &RgbImage) -> Result<String, PipelineError> {
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageFormat::Png)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(png.into_inner()))
}

fn decode_png_base64(data: &str) -> Result<RgbImage, PipelineError> {
    // Tolerate data URLs
    let data = data
        .split_once("base64,")
        .map(|(_, rest)| rest)
        .unwrap_or(data);
    let bytes = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
    let image: DynamicImage = image::load_from_memory(&bytes)?;
    Ok(image.to_rgb8())
}
