//! # Audio Session Walkthrough
//!
//! Drives a session against a console device that only logs the commands it
//! receives, including a simulated end of track.
//!
//! Run with: `cargo run --example session_demo --package core-playback`
//!
//! Pass `json` or `compact` as the first argument to switch the log format.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    AudioAsset, AudioChannel, AudioDevice, ChannelId, ChannelStatus, LoadOptions, LogLevel,
    OutputMode, StatusCallback,
};
use core_playback::AudioSession;
use core_runtime::config::AudioConfig;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

// ============================================================================
// Console Device
// ============================================================================

struct ConsoleChannel {
    id: ChannelId,
    name: String,
    callback: Mutex<Option<StatusCallback>>,
}

impl ConsoleChannel {
    fn finish(&self) {
        if let Some(callback) = self.callback.lock().unwrap().as_ref() {
            callback(ChannelStatus::finished());
        }
    }
}

#[async_trait::async_trait]
impl AudioChannel for ConsoleChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    async fn play(&self) -> BridgeResult<()> {
        println!("  [{}] play", self.name);
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        println!("  [{}] pause", self.name);
        Ok(())
    }

    async fn stop(&self) -> BridgeResult<()> {
        println!("  [{}] stop", self.name);
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        println!("  [{}] volume = {:.2}", self.name, volume);
        Ok(())
    }

    async fn set_looping(&self, looping: bool) -> BridgeResult<()> {
        println!("  [{}] looping = {}", self.name, looping);
        Ok(())
    }

    async fn unload(&self) -> BridgeResult<()> {
        println!("  [{}] unload", self.name);
        Ok(())
    }

    fn set_status_callback(&self, callback: Option<StatusCallback>) {
        *self.callback.lock().unwrap() = callback;
    }
}

#[derive(Default)]
struct ConsoleDevice {
    channels: Mutex<Vec<Arc<ConsoleChannel>>>,
}

#[async_trait::async_trait]
impl AudioDevice for ConsoleDevice {
    async fn configure_output_mode(&self, mode: OutputMode) -> BridgeResult<()> {
        println!("  [device] output mode {:?}", mode);
        Ok(())
    }

    async fn load(
        &self,
        asset: &AudioAsset,
        options: LoadOptions,
    ) -> BridgeResult<Arc<dyn AudioChannel>> {
        println!("  [device] load {} {:?}", asset.describe(), options);
        let channel = Arc::new(ConsoleChannel {
            id: ChannelId::new(),
            name: asset.describe(),
            callback: Mutex::new(None),
        });
        self.channels.lock().unwrap().push(Arc::clone(&channel));
        Ok(channel)
    }
}

// ============================================================================
// Walkthrough
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let format = match std::env::args().nth(1).as_deref() {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };
    init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Debug),
    )?;

    let device = Arc::new(ConsoleDevice::default());
    let config = AudioConfig::builder()
        .device(Arc::clone(&device) as Arc<dyn AudioDevice>)
        .background_asset(AudioAsset::bundled("theme.mp3"))
        .voiceover_asset(AudioAsset::bundled("welcome.mp3"))
        .build()?;

    let session = AudioSession::new(&config);
    let playback = session.playback();

    println!("\n=== Initialize (volume set first) ===");
    playback.set_volume(0.6).await;
    session.initialize().await?;

    println!("\n=== Play ===");
    playback.play().await;
    info!(state = ?session.state().snapshot(), "after play");

    println!("\n=== Voiceover ===");
    session.voiceover().play_voiceover().await;

    println!("\n=== Natural end of track ===");
    let background = device.channels.lock().unwrap().first().cloned();
    if let Some(background) = background {
        background.finish();
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    info!(state = ?session.state().snapshot(), "after finish");

    println!("\n=== Disable, enable, play ===");
    playback.set_enabled(false).await;
    playback.set_enabled(true).await;
    info!(playing = session.state().is_playing(), "enabled again, still paused");
    playback.play().await;

    println!("\n=== Teardown ===");
    session.teardown().await;

    Ok(())
}
