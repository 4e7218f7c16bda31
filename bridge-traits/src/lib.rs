//! # Host Bridge Traits
//!
//! Capabilities the audio core requires from the host platform.
//!
//! ## Overview
//!
//! The core owns the playback state machine but nothing that touches real
//! hardware. Each host supplies implementations of the traits below:
//!
//! - [`AudioDevice`](audio::AudioDevice) - output-mode configuration and asset loading
//! - [`AudioChannel`](audio::AudioChannel) - play/pause/stop/volume/looping commands on a
//!   loaded asset plus a single status-notification slot
//! - [`LoggerSink`](logging::LoggerSink) - forwards structured logs to host logging
//!
//! ## Fail-Fast Strategy
//!
//! A missing device is a wiring bug, not a runtime condition. The runtime
//! configuration builder refuses to build without one:
//!
//! ```ignore
//! use core_runtime::config::AudioConfig;
//!
//! let config = AudioConfig::builder()
//!     .background_asset(AudioAsset::bundled("theme.mp3"))
//!     .build()?; // Err(CapabilityMissing { capability: "AudioDevice", .. })
//! ```
//!
//! ## Error Handling
//!
//! Every bridge call returns [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and keep messages actionable.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`. Status callbacks may be invoked
//! from any thread.

pub mod audio;
pub mod error;
pub mod logging;
pub mod platform;

pub use error::BridgeError;

pub use audio::{
    AudioAsset, AudioChannel, AudioDevice, ChannelId, ChannelStatus, LoadOptions, OutputMode,
    StatusCallback,
};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink, MemoryLogger};
