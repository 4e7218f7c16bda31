//! In-memory audio device shared by the integration tests.
//!
//! Every channel records the commands it receives, can be told to reject a
//! command, can hold a command until the test releases it, and can deliver
//! synthetic status notifications through its registered callback.

#![allow(dead_code)]

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    AudioAsset, AudioChannel, AudioDevice, BridgeError, ChannelId, ChannelStatus, LoadOptions,
    OutputMode, StatusCallback,
};
use core_playback::AudioSession;
use core_runtime::config::AudioConfig;
use core_runtime::events::{CoreEvent, Receiver};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub const BACKGROUND: &str = "theme.mp3";
pub const VOICEOVER: &str = "welcome.mp3";

// ============================================================================
// Fake Channel
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Play,
    Pause,
    Stop,
    SetVolume,
    SetLooping,
    Unload,
}

#[derive(Default)]
struct ChannelState {
    playing: bool,
    looping: bool,
    volume: f32,
    unloaded: bool,
    ops: Vec<Op>,
    failing: HashSet<Op>,
    held: HashMap<Op, Arc<Notify>>,
}

pub struct FakeChannel {
    id: ChannelId,
    name: String,
    state: Mutex<ChannelState>,
    callback: Mutex<Option<StatusCallback>>,
}

impl FakeChannel {
    fn new(name: String, options: LoadOptions) -> Self {
        Self {
            id: ChannelId::new(),
            name,
            state: Mutex::new(ChannelState {
                playing: options.should_play,
                looping: options.looping,
                volume: options.volume,
                ..Default::default()
            }),
            callback: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn is_looping(&self) -> bool {
        self.state.lock().looping
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    pub fn is_unloaded(&self) -> bool {
        self.state.lock().unloaded
    }

    pub fn ops(&self) -> Vec<Op> {
        self.state.lock().ops.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.state.lock().ops.iter().filter(|o| **o == op).count()
    }

    pub fn clear_ops(&self) {
        self.state.lock().ops.clear();
    }

    /// Reject every subsequent `op` with `OperationFailed`.
    pub fn fail(&self, op: Op) {
        self.state.lock().failing.insert(op);
    }

    pub fn recover(&self, op: Op) {
        self.state.lock().failing.remove(&op);
    }

    /// Suspend the next `op` until the returned handle is notified.
    pub fn hold(&self, op: Op) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.state.lock().held.insert(op, Arc::clone(&notify));
        notify
    }

    pub fn has_callback(&self) -> bool {
        self.callback.lock().is_some()
    }

    /// Deliver a status notification as the device would.
    pub fn emit_status(&self, status: ChannelStatus) {
        if let Some(callback) = self.callback.lock().as_ref() {
            callback(status);
        }
    }

    /// Simulate the device reaching the end of the asset.
    pub fn finish(&self) {
        self.state.lock().playing = false;
        self.emit_status(ChannelStatus::finished());
    }

    async fn run(&self, op: Op, apply: impl FnOnce(&mut ChannelState)) -> BridgeResult<()> {
        let held = {
            let mut state = self.state.lock();
            state.ops.push(op);
            state.held.remove(&op)
        };
        if let Some(notify) = held {
            notify.notified().await;
        }

        let mut state = self.state.lock();
        if state.unloaded {
            return Err(BridgeError::Unloaded);
        }
        if state.failing.contains(&op) {
            return Err(BridgeError::OperationFailed(format!("{:?} rejected", op)));
        }
        apply(&mut *state);
        Ok(())
    }
}

#[async_trait::async_trait]
impl AudioChannel for FakeChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    async fn play(&self) -> BridgeResult<()> {
        self.run(Op::Play, |s| s.playing = true).await
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.run(Op::Pause, |s| s.playing = false).await
    }

    async fn stop(&self) -> BridgeResult<()> {
        self.run(Op::Stop, |s| s.playing = false).await
    }

    async fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        self.run(Op::SetVolume, |s| s.volume = volume).await
    }

    async fn set_looping(&self, looping: bool) -> BridgeResult<()> {
        self.run(Op::SetLooping, |s| s.looping = looping).await
    }

    async fn unload(&self) -> BridgeResult<()> {
        self.run(Op::Unload, |s| {
            s.playing = false;
            s.unloaded = true;
        })
        .await
    }

    fn set_status_callback(&self, callback: Option<StatusCallback>) {
        *self.callback.lock() = callback;
    }
}

// ============================================================================
// Fake Device
// ============================================================================

#[derive(Default)]
struct DeviceState {
    output_modes: Vec<OutputMode>,
    loads: Vec<(String, LoadOptions)>,
    channels: HashMap<String, Arc<FakeChannel>>,
    reject_output_mode: bool,
    missing_assets: HashSet<String>,
    held_load: Option<Arc<Notify>>,
}

#[derive(Default)]
pub struct FakeDevice {
    state: Mutex<DeviceState>,
}

impl FakeDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reject_output_mode(&self, reject: bool) {
        self.state.lock().reject_output_mode = reject;
    }

    pub fn remove_asset(&self, name: &str) {
        self.state.lock().missing_assets.insert(name.to_string());
    }

    pub fn restore_asset(&self, name: &str) {
        self.state.lock().missing_assets.remove(name);
    }

    /// Suspend the next load until the returned handle is notified.
    pub fn hold_load(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.state.lock().held_load = Some(Arc::clone(&notify));
        notify
    }

    pub fn output_modes(&self) -> Vec<OutputMode> {
        self.state.lock().output_modes.clone()
    }

    pub fn loads(&self) -> Vec<(String, LoadOptions)> {
        self.state.lock().loads.clone()
    }

    /// Most recently loaded channel for `name`.
    pub fn channel(&self, name: &str) -> Option<Arc<FakeChannel>> {
        self.state.lock().channels.get(name).cloned()
    }

    pub fn background(&self) -> Arc<FakeChannel> {
        self.channel(BACKGROUND).expect("background channel loaded")
    }

    pub fn voiceover(&self) -> Arc<FakeChannel> {
        self.channel(VOICEOVER).expect("voiceover channel loaded")
    }
}

#[async_trait::async_trait]
impl AudioDevice for FakeDevice {
    async fn configure_output_mode(&self, mode: OutputMode) -> BridgeResult<()> {
        let mut state = self.state.lock();
        state.output_modes.push(mode);
        if state.reject_output_mode {
            return Err(BridgeError::NotAvailable("output mode rejected".into()));
        }
        Ok(())
    }

    async fn load(
        &self,
        asset: &AudioAsset,
        options: LoadOptions,
    ) -> BridgeResult<Arc<dyn AudioChannel>> {
        let name = asset.describe();

        let held = self.state.lock().held_load.take();
        if let Some(notify) = held {
            notify.notified().await;
        }

        let mut state = self.state.lock();
        state.loads.push((name.clone(), options));
        if state.missing_assets.contains(&name) {
            return Err(BridgeError::AssetNotFound(name));
        }

        let channel = Arc::new(FakeChannel::new(name.clone(), options));
        state.channels.insert(name, Arc::clone(&channel));
        Ok(channel)
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn config(device: Arc<FakeDevice>) -> AudioConfig {
    AudioConfig::builder()
        .device(device)
        .background_asset(AudioAsset::bundled(BACKGROUND))
        .voiceover_asset(AudioAsset::bundled(VOICEOVER))
        .build()
        .expect("valid config")
}

pub async fn initialized_session(device: &Arc<FakeDevice>) -> AudioSession {
    let session = AudioSession::new(&config(Arc::clone(device)));
    session.initialize().await.expect("session initializes");
    session
}

/// Everything published since the last drain.
pub fn drain(events: &mut Receiver<CoreEvent>) -> Vec<CoreEvent> {
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    received
}

/// Yield to spawned tasks until `condition` holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition reached before timeout");
}

/// Let spawned tasks run for a few scheduler turns.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Spawn `future` and give it a chance to reach its first suspension point.
pub async fn spawn_started<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let handle = tokio::spawn(future);
    settle().await;
    handle
}
