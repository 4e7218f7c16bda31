//! # Audio Configuration
//!
//! Builder-based configuration for the background-music session.
//!
//! ## Overview
//!
//! [`AudioConfig`] bundles the host's [`AudioDevice`], the two asset
//! references (background loop and optional voiceover) and the initial
//! session values. The builder validates everything up front so a session
//! never starts with an impossible volume or without a device.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::AudioAsset;
//! use core_runtime::config::AudioConfig;
//! use std::sync::Arc;
//!
//! let config = AudioConfig::builder()
//!     .device(Arc::new(MyDevice::new()))
//!     .background_asset(AudioAsset::bundled("theme.mp3"))
//!     .voiceover_asset(AudioAsset::bundled("welcome.mp3"))
//!     .initial_volume(0.6)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! A missing device yields [`Error::CapabilityMissing`] with a message that
//! says what to inject. Out-of-range values yield [`Error::Config`].

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{AudioAsset, AudioDevice, OutputMode};
use std::sync::Arc;

/// Volume used for the background loop when none is configured.
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Fixed volume of the voiceover channel. It never follows the background volume.
pub const DEFAULT_VOICEOVER_VOLUME: f32 = 0.8;

/// Configuration for an audio session.
#[derive(Clone)]
pub struct AudioConfig {
    /// Host audio device (required)
    pub device: Arc<dyn AudioDevice>,

    /// Asset looped in the background
    pub background_asset: AudioAsset,

    /// One-shot voiceover asset; no voiceover channel is loaded without it
    pub voiceover_asset: Option<AudioAsset>,

    /// Background volume before any `set_volume` call
    pub initial_volume: f32,

    /// Fixed voiceover volume
    pub voiceover_volume: f32,

    /// Whether background playback starts enabled
    pub start_enabled: bool,

    /// Output mode applied once before the first load
    pub output_mode: OutputMode,

    /// Capacity of the session event bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for AudioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioConfig")
            .field("device", &"AudioDevice { ... }")
            .field("background_asset", &self.background_asset.describe())
            .field(
                "voiceover_asset",
                &self.voiceover_asset.as_ref().map(AudioAsset::describe),
            )
            .field("initial_volume", &self.initial_volume)
            .field("voiceover_volume", &self.voiceover_volume)
            .field("start_enabled", &self.start_enabled)
            .field("output_mode", &self.output_mode)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl AudioConfig {
    pub fn builder() -> AudioConfigBuilder {
        AudioConfigBuilder::default()
    }

    /// Checks value ranges. Called by [`AudioConfigBuilder::build`].
    pub fn validate(&self) -> Result<()> {
        validate_volume("initial_volume", self.initial_volume)?;
        validate_volume("voiceover_volume", self.voiceover_volume)?;

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "event_buffer_size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_volume(field: &str, volume: f32) -> Result<()> {
    if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
        return Err(Error::Config(format!(
            "{} must be between 0.0 and 1.0 (got {})",
            field, volume
        )));
    }
    Ok(())
}

fn device_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "AudioDevice".to_string(),
        message: "No audio device provided. Inject the host's AudioDevice implementation \
                  with AudioConfig::builder().device(...)."
            .to_string(),
    }
}

/// Builder for [`AudioConfig`].
#[derive(Default)]
pub struct AudioConfigBuilder {
    device: Option<Arc<dyn AudioDevice>>,
    background_asset: Option<AudioAsset>,
    voiceover_asset: Option<AudioAsset>,
    initial_volume: Option<f32>,
    voiceover_volume: Option<f32>,
    start_enabled: Option<bool>,
    output_mode: Option<OutputMode>,
    event_buffer_size: Option<usize>,
}

impl AudioConfigBuilder {
    /// Set the host audio device (required).
    pub fn device(mut self, device: Arc<dyn AudioDevice>) -> Self {
        self.device = Some(device);
        self
    }

    /// Set the looped background asset (required).
    pub fn background_asset(mut self, asset: AudioAsset) -> Self {
        self.background_asset = Some(asset);
        self
    }

    pub fn voiceover_asset(mut self, asset: AudioAsset) -> Self {
        self.voiceover_asset = Some(asset);
        self
    }

    pub fn initial_volume(mut self, volume: f32) -> Self {
        self.initial_volume = Some(volume);
        self
    }

    pub fn voiceover_volume(mut self, volume: f32) -> Self {
        self.voiceover_volume = Some(volume);
        self
    }

    pub fn start_enabled(mut self, enabled: bool) -> Self {
        self.start_enabled = Some(enabled);
        self
    }

    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = Some(mode);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when no device was provided
    /// - [`Error::Config`] when the background asset is missing or a value is out of range
    pub fn build(self) -> Result<AudioConfig> {
        let device = self.device.ok_or_else(device_missing_error)?;

        let background_asset = self
            .background_asset
            .ok_or_else(|| Error::Config("background_asset is required".to_string()))?;

        let config = AudioConfig {
            device,
            background_asset,
            voiceover_asset: self.voiceover_asset,
            initial_volume: self.initial_volume.unwrap_or(DEFAULT_VOLUME),
            voiceover_volume: self.voiceover_volume.unwrap_or(DEFAULT_VOICEOVER_VOLUME),
            start_enabled: self.start_enabled.unwrap_or(true),
            output_mode: self.output_mode.unwrap_or_default(),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;
        Ok(config)
    }
}
