/// User settings
///
/// Stored as JSON in the user's config directory:
/// - Linux: ~/.config/sharpify/settings.json
/// - macOS: ~/Library/Application Support/sharpify/settings.json
/// - Windows: %APPDATA%\sharpify\settings.json
///
/// Every field has a default, so a partial file (or no file) is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::upscaler::pipeline::Device;
use crate::upscaler::InferenceParams;

/// Environment variable overriding the model server endpoint
pub const ENV_ENDPOINT: &str = "SHARPIFY_ENDPOINT";
/// Environment variable overriding the device preference
pub const ENV_DEVICE: &str = "SHARPIFY_DEVICE";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which device the model server should use
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// Whatever the server picked at load time
    #[default]
    Auto,
    Cuda,
    Cpu,
}

impl DevicePreference {
    /// Resolve against the device reported by the server
    pub fn resolve(self, reported: Device) -> Device {
        match self {
            DevicePreference::Auto => reported,
            DevicePreference::Cuda => Device::Cuda,
            DevicePreference::Cpu => Device::Cpu,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(DevicePreference::Auto),
            "cuda" | "gpu" => Some(DevicePreference::Cuda),
            "cpu" => Some(DevicePreference::Cpu),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the model server
    pub endpoint: String,
    /// Pretrained pipeline the server should have loaded
    pub model_id: String,
    pub device: DevicePreference,
    /// Longest side allowed before inference
    pub max_side: u32,
    pub prompt: String,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub seed: u64,
    /// Per-request timeout; diffusion on CPU is slow
    pub timeout_secs: u64,
    /// Where the save dialog opens
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let output_dir = dirs::picture_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sharpify");

        Self {
            endpoint: "http://127.0.0.1:7861".to_string(),
            model_id: "stabilityai/stable-diffusion-x4-upscaler".to_string(),
            device: DevicePreference::Auto,
            max_side: 384,
            prompt: "enhance quality, sharp details, high resolution photograph".to_string(),
            num_inference_steps: 15,
            guidance_scale: 7.0,
            seed: 42,
            timeout_secs: 600,
            output_dir,
        }
    }
}

impl Settings {
    /// Default location of the settings file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sharpify").join("settings.json"))
    }

    /// Load settings for this process: file (if any), then env overrides.
    ///
    /// Never fails; problems are logged and defaults are used instead.
    pub fn load() -> Self {
        let mut settings = match Self::default_path() {
            Some(path) => match Self::from_file(&path) {
                Ok(Some(settings)) => {
                    log::info!("⚙️  Loaded settings from {}", path.display());
                    settings
                }
                Ok(None) => {
                    let defaults = Self::default();
                    match defaults.save_to(&path) {
                        Ok(()) => log::info!("⚙️  Wrote default settings to {}", path.display()),
                        Err(e) => log::debug!("Could not write {}: {}", path.display(), e),
                    }
                    defaults
                }
                Err(e) => {
                    log::warn!("⚠️  Ignoring {}: {}", path.display(), e);
                    Self::default()
                }
            },
            None => Self::default(),
        };

        settings.apply_overrides(|key| std::env::var(key).ok());
        settings.sanitize();
        settings
    }

    /// Replace values the rest of the app can't work with by their defaults
    pub fn sanitize(&mut self) {
        let defaults = Self::default();
        if self.max_side == 0 {
            log::warn!("⚠️  max_side must be at least 1, using {}", defaults.max_side);
            self.max_side = defaults.max_side;
        }
        if self.timeout_secs == 0 {
            log::warn!("⚠️  timeout_secs must be at least 1, using {}", defaults.timeout_secs);
            self.timeout_secs = defaults.timeout_secs;
        }
    }

    /// Write settings to `path`, creating the parent directory
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read settings from `path`; `Ok(None)` if the file doesn't exist
    pub fn from_file(path: &Path) -> Result<Option<Self>, SettingsError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        Ok(Some(Self::from_json(&json)?))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            self.endpoint = endpoint.trim().to_string();
        }
        if let Some(value) = lookup(ENV_DEVICE) {
            match DevicePreference::parse(&value) {
                Some(device) => self.device = device,
                None => log::warn!("⚠️  Unknown {}={:?}, keeping {:?}", ENV_DEVICE, value, self.device),
            }
        }
    }

    /// Fixed knobs handed to every inference call
    pub fn inference_params(&self) -> InferenceParams {
        InferenceParams {
            prompt: self.prompt.clone(),
            num_inference_steps: self.num_inference_steps,
            guidance_scale: self.guidance_scale,
            seed: self.seed,
        }
    }
}
