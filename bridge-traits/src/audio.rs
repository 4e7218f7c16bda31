//! Audio device bridge traits and supporting types.
//!
//! The core never decodes or renders audio itself. Hosts hand it an
//! [`AudioDevice`] that can switch the platform output mode and load assets
//! into [`AudioChannel`]s; the core then drives those channels through a small
//! async command surface and listens for [`ChannelStatus`] notifications.

use crate::{error::Result, platform::PlatformSendSync};
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Asset reference resolved by the host's asset loader.
///
/// The core treats these as opaque identifiers and only uses them for
/// loading and log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioAsset {
    /// Asset packaged with the application, addressed by name.
    Bundled { name: String },
    /// Asset on the local filesystem.
    LocalFile { path: PathBuf },
    /// Encoded audio already held in memory.
    MemoryBuffer { data: Bytes },
}

impl AudioAsset {
    /// Convenience constructor for bundled assets.
    pub fn bundled(name: impl Into<String>) -> Self {
        AudioAsset::Bundled { name: name.into() }
    }

    /// Short label suitable for log fields. Paths are reduced to their file name.
    pub fn describe(&self) -> String {
        match self {
            AudioAsset::Bundled { name } => name.clone(),
            AudioAsset::LocalFile { path } => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "<file>".to_string()),
            AudioAsset::MemoryBuffer { data } => format!("<memory:{} bytes>", data.len()),
        }
    }
}

/// Options applied when a channel is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    /// Start playing as soon as the asset is loaded.
    pub should_play: bool,
    /// Loop back to the start when the end of the asset is reached.
    pub looping: bool,
    /// Initial channel volume (0.0 = muted, 1.0 = unity gain).
    pub volume: f32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            should_play: false,
            looping: false,
            volume: 1.0,
        }
    }
}

impl LoadOptions {
    pub fn with_should_play(mut self, should_play: bool) -> Self {
        self.should_play = should_play;
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }
}

/// Platform output mode requested before any channel is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputMode {
    /// Keep playing when the device's hardware silent switch is on.
    pub plays_in_silent_mode: bool,
    /// Request the microphone/recording capability.
    pub allows_recording: bool,
    /// Let other applications duck our output (and vice versa).
    pub ducks_others: bool,
    /// Route output through the earpiece instead of the speaker.
    pub routes_to_earpiece: bool,
}

impl OutputMode {
    /// Background-music preset: audible in silent mode, no recording,
    /// ducking permitted, speaker routing.
    pub const fn ambient() -> Self {
        Self {
            plays_in_silent_mode: true,
            allows_recording: false,
            ducks_others: true,
            routes_to_earpiece: false,
        }
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        Self::ambient()
    }
}

/// Status notification delivered by a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelStatus {
    pub is_loaded: bool,
    pub is_playing: bool,
    pub is_looping: bool,
    /// Set on the single notification emitted when playback reaches the end
    /// of the asset naturally (not on stop/pause).
    pub did_just_finish: bool,
}

impl ChannelStatus {
    /// Status reported by a loaded channel that just played to the end.
    pub fn finished() -> Self {
        Self {
            is_loaded: true,
            is_playing: false,
            is_looping: false,
            did_just_finish: true,
        }
    }
}

/// Identity of a loaded channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(Uuid);

impl ChannelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

/// Callback registered in a channel's single status slot.
pub type StatusCallback = Box<dyn Fn(ChannelStatus) + Send + Sync>;

/// A loaded asset bound to a device output channel.
///
/// A channel must not be used after [`AudioChannel::unload`]; implementations
/// should answer with [`BridgeError::Unloaded`](crate::BridgeError::Unloaded).
#[async_trait::async_trait]
pub trait AudioChannel: PlatformSendSync {
    fn id(&self) -> ChannelId;

    /// Start or resume playback from the current position.
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the current position.
    async fn pause(&self) -> Result<()>;

    /// Stop playback and rewind to the start of the asset.
    async fn stop(&self) -> Result<()>;

    /// Volume is normalized to `0.0..=1.0`.
    async fn set_volume(&self, volume: f32) -> Result<()>;

    async fn set_looping(&self, looping: bool) -> Result<()>;

    /// Release the device resources held by this channel.
    async fn unload(&self) -> Result<()>;

    /// Replace the status callback. `None` removes the current subscription.
    fn set_status_callback(&self, callback: Option<StatusCallback>);
}

/// Host audio device capable of loading assets into channels.
#[async_trait::async_trait]
pub trait AudioDevice: PlatformSendSync {
    /// Apply the platform output mode. Called before the first load.
    async fn configure_output_mode(&self, mode: OutputMode) -> Result<()>;

    /// Load and decode an asset into a new channel.
    async fn load(&self, asset: &AudioAsset, options: LoadOptions) -> Result<Arc<dyn AudioChannel>>;
}
