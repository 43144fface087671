/// Image upscaling wrapper
///
/// This module handles:
/// - Normalizing the uploaded image (RGB, size cap)
/// - Calling the pretrained pipeline with fixed parameters
/// - Turning every failure into a status message for the UI
///
/// The pipeline is injected, so the wrapper can be built around the real
/// model server or around an in-process fake in tests.

pub mod pipeline;
pub mod prepare;
pub mod remote;

#[cfg(test)]
pub(crate) mod fake;

use image::{DynamicImage, RgbImage};

use pipeline::{Device, PipelineError, UpscalePipeline, UpscaleRequest};

pub const MSG_MISSING_INPUT: &str = "Please upload an image.";
pub const MSG_SUCCESS: &str = "Image upscaled successfully!";
pub const MSG_OUT_OF_MEMORY: &str =
    "Out of memory error. Please try with a smaller image or restart the application.";

/// Inference knobs fixed for the lifetime of the process
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceParams {
    pub prompt: String,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub seed: u64,
}

/// Result of one upscale call: an image on success, always a status line
#[derive(Debug, Clone)]
pub struct UpscaleOutcome {
    pub image: Option<RgbImage>,
    pub status: String,
}

impl UpscaleOutcome {
    fn failed(status: impl Into<String>) -> Self {
        Self {
            image: None,
            status: status.into(),
        }
    }
}

/// Loaded model plus the parameters used for every call
pub struct Upscaler {
    pipeline: Box<dyn UpscalePipeline>,
    device: Device,
    max_side: u32,
    params: InferenceParams,
}

impl Upscaler {
    pub fn new(pipeline: Box<dyn UpscalePipeline>, max_side: u32, params: InferenceParams) -> Self {
        let device = pipeline.device();
        log::info!(
            "🖥️  Using device: {} ({} steps, guidance {}, seed {})",
            device, params.num_inference_steps, params.guidance_scale, params.seed
        );
        Self {
            pipeline,
            device,
            max_side,
            params,
        }
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Upscale `image`, or explain why not.
    ///
    /// Never panics on pipeline failure and never returns an error: the
    /// outcome always carries a message fit for the status line.
    pub fn upscale(&self, image: Option<&DynamicImage>) -> UpscaleOutcome {
        let Some(image) = image else {
            return UpscaleOutcome::failed(MSG_MISSING_INPUT);
        };

        let request = UpscaleRequest {
            image: prepare::prepare_input(image, self.max_side),
            prompt: self.params.prompt.clone(),
            num_inference_steps: self.params.num_inference_steps,
            guidance_scale: self.params.guidance_scale,
            seed: self.params.seed,
        };

        self.clear_cache();
        let result = self.pipeline.run(&request);
        self.clear_cache();

        match result {
            Ok(upscaled) => {
                log::info!(
                    "✅ Upscaled {}x{} -> {}x{}",
                    request.image.width(),
                    request.image.height(),
                    upscaled.width(),
                    upscaled.height()
                );
                UpscaleOutcome {
                    image: Some(upscaled),
                    status: MSG_SUCCESS.to_string(),
                }
            }
            Err(e) => {
                log::error!("❌ Upscaling failed: {}", e);
                if matches!(e, PipelineError::OutOfMemory(_)) {
                    self.clear_cache();
                }
                UpscaleOutcome::failed(status_for_error(&e))
            }
        }
    }

    /// Accelerator housekeeping; failures only get logged
    fn clear_cache(&self) {
        if !self.device.is_accelerator() {
            return;
        }
        if let Err(e) = self.pipeline.empty_cache() {
            log::debug!("Could not clear accelerator cache: {}", e);
        }
    }
}

impl std::fmt::Debug for Upscaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upscaler")
            .field("device", &self.device)
            .field("max_side", &self.max_side)
            .field("params", &self.params)
            .finish()
    }
}

/// Map a pipeline failure to the user-facing status line
pub fn status_for_error(error: &PipelineError) -> String {
    match error {
        PipelineError::OutOfMemory(_) => MSG_OUT_OF_MEMORY.to_string(),
        PipelineError::Runtime(message) => format!("Runtime error during upscaling: {}", message),
        other => format!("Error during upscaling: {}", other),
    }
}
