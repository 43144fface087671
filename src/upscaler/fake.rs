/// In-process pipeline for tests
///
/// Records every call and either upscales deterministically or fails in a
/// chosen way, so the wrapper and the window can be exercised without a
/// model server.

use image::{Rgb, RgbImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::pipeline::{Device, PipelineError, UpscalePipeline, UpscaleRequest};
use super::{InferenceParams, Upscaler};

/// Calls observed by a fake pipeline
#[derive(Default)]
pub(crate) struct Calls {
    pub runs: AtomicUsize,
    pub cache_clears: AtomicUsize,
    pub last_request: Mutex<Option<UpscaleRequest>>,
}

impl Calls {
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn cache_clears(&self) -> usize {
        self.cache_clears.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<UpscaleRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

pub(crate) enum Behaviour {
    /// Nearest-neighbour x4 with seed-dependent dithering
    Upscale,
    OutOfMemory,
    Runtime(&'static str),
    Protocol(&'static str),
}

pub(crate) struct FakePipeline {
    device: Device,
    behaviour: Behaviour,
    calls: Arc<Calls>,
}

impl FakePipeline {
    pub fn boxed(device: Device, behaviour: Behaviour) -> (Box<dyn UpscalePipeline>, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let pipeline = FakePipeline {
            device,
            behaviour,
            calls: Arc::clone(&calls),
        };
        (Box::new(pipeline), calls)
    }
}

impl UpscalePipeline for FakePipeline {
    fn device(&self) -> Device {
        self.device
    }

    fn run(&self, request: &UpscaleRequest) -> Result<RgbImage, PipelineError> {
        self.calls.runs.fetch_add(1, Ordering::SeqCst);
        *self.calls.last_request.lock().unwrap() = Some(request.clone());

        match self.behaviour {
            Behaviour::Upscale => {
                let (w, h) = request.image.dimensions();
                let mut state = request.seed;
                Ok(RgbImage::from_fn(w * 4, h * 4, |x, y| {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    let noise = (state >> 61) as u8;
                    let src = request.image.get_pixel(x / 4, y / 4).0;
                    Rgb([src[0] ^ noise, src[1] ^ noise, src[2] ^ noise])
                }))
            }
            Behaviour::OutOfMemory => Err(PipelineError::OutOfMemory(
                "CUDA out of memory. Tried to allocate 2.00 GiB".to_string(),
            )),
            Behaviour::Runtime(message) => Err(PipelineError::Runtime(message.to_string())),
            Behaviour::Protocol(message) => Err(PipelineError::Protocol(message.to_string())),
        }
    }

    fn empty_cache(&self) -> Result<(), PipelineError> {
        self.calls.cache_clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Default laptop knobs
pub(crate) fn params() -> InferenceParams {
    InferenceParams {
        prompt: "enhance quality, sharp details, high resolution photograph".to_string(),
        num_inference_steps: 15,
        guidance_scale: 7.0,
        seed: 42,
    }
}

/// Upscaler around a fresh fake, plus its call log
pub(crate) fn upscaler(device: Device, behaviour: Behaviour) -> (Upscaler, Arc<Calls>) {
    let (pipeline, calls) = FakePipeline::boxed(device, behaviour);
    (Upscaler::new(pipeline, 384, params()), calls)
}
