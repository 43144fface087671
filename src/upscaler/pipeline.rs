/// Model boundary for the pretrained super-resolution pipeline
///
/// The upscaler never does the heavy lifting itself. It hands a prepared
/// RGB image and the fixed inference knobs to something implementing
/// [`UpscalePipeline`] and gets an RGB image back.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Compute device the pipeline runs on
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cuda,
    Cpu,
}

impl Device {
    /// Accelerators get their memory cache cleared around each inference
    pub fn is_accelerator(self) -> bool {
        matches!(self, Device::Cuda)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Cpu => "cpu",
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the pipeline needs for one inference call
#[derive(Debug, Clone)]
pub struct UpscaleRequest {
    /// Normalized low resolution input
    pub image: RgbImage,
    /// Text prompt steering the diffusion model
    pub prompt: String,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    /// Fixed seed so identical inputs give identical outputs
    pub seed: u64,
}

/// Failures surfaced by a pipeline implementation
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The accelerator (or host) ran out of memory
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// The model itself failed while running
    #[error("{0}")]
    Runtime(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("invalid base64 payload: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The backend answered with something we don't understand
    #[error("unexpected response: {0}")]
    Protocol(String),
}

/// A loaded pretrained upscaling pipeline
///
/// Implementations are not required to be reentrant: callers keep at most
/// one `run` in flight.
pub trait UpscalePipeline: Send + Sync {
    /// Device selected when the pipeline was loaded
    fn device(&self) -> Device;

    /// Run one inference and return the upscaled image
    fn run(&self, request: &UpscaleRequest) -> Result<RgbImage, PipelineError>;

    /// Release cached accelerator memory
    fn empty_cache(&self) -> Result<(), PipelineError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_cuda_is_accelerator() {
        assert!(Device::Cuda.is_accelerator());
        assert!(!Device::Cpu.is_accelerator());
    }

    #[test]
    fn test_device_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Device::Cuda).unwrap(), "\"cuda\"");
        let device: Device = serde_json::from_str("\"cpu\"").unwrap();
        assert_eq!(device, Device::Cpu);
    }
}
