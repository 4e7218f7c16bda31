//! # Audio Session
//!
//! Owns the two device channels (background loop and voiceover) and their
//! lifecycle. Controllers borrow the channels through the shared session
//! state; only [`AudioSession::initialize`] creates them and only
//! [`AudioSession::teardown`] destroys them.
//!
//! ## Concurrency
//!
//! Every device call is an await point. The channel table lives behind a
//! `parking_lot::Mutex` that is never held across an await; callers clone the
//! `Arc` they need and re-check that it is still the installed channel after
//! each device call resumes. A monotonically increasing *transition ticket*
//! lets a slow `play` notice that a later `pause`/`stop` superseded it.

use crate::controller::PlaybackController;
use crate::error::{PlaybackError, Result};
use crate::listener::FinishListener;
use crate::state::{PlaybackStatus, StateStore};
use crate::voiceover::VoiceoverController;

use bridge_traits::{AudioAsset, AudioChannel, AudioDevice, BridgeError, LoadOptions, OutputMode};
use core_runtime::config::AudioConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent, SessionEvent};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

#[derive(Default)]
struct Channels {
    background: Option<Arc<dyn AudioChannel>>,
    voiceover: Option<Arc<dyn AudioChannel>>,
    listener: Option<FinishListener>,
}

/// State shared by the session and its controllers.
pub(crate) struct SessionShared {
    device: Arc<dyn AudioDevice>,
    background_asset: AudioAsset,
    voiceover_asset: Option<AudioAsset>,
    voiceover_volume: f32,
    output_mode: OutputMode,
    pub(crate) store: StateStore,
    pub(crate) events: EventBus,
    channels: Mutex<Channels>,
    /// Serializes voiceover stop/play pairs.
    pub(crate) voiceover_lock: tokio::sync::Mutex<()>,
    output_configured: AtomicBool,
    initializing: AtomicBool,
    /// Bumped by every teardown.
    generation: AtomicU64,
    /// Bumped by every background transition.
    transition: AtomicU64,
}

impl SessionShared {
    pub(crate) fn background(&self) -> Option<Arc<dyn AudioChannel>> {
        self.channels.lock().background.clone()
    }

    pub(crate) fn voiceover(&self) -> Option<Arc<dyn AudioChannel>> {
        self.channels.lock().voiceover.clone()
    }

    pub(crate) fn is_current_background(&self, channel: &Arc<dyn AudioChannel>) -> bool {
        self.channels
            .lock()
            .background
            .as_ref()
            .is_some_and(|current| current.id() == channel.id())
    }

    pub(crate) fn is_current_voiceover(&self, channel: &Arc<dyn AudioChannel>) -> bool {
        self.channels
            .lock()
            .voiceover
            .as_ref()
            .is_some_and(|current| current.id() == channel.id())
    }

    pub(crate) fn begin_transition(&self) -> u64 {
        self.transition.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn is_latest_transition(&self, ticket: u64) -> bool {
        self.transition.load(Ordering::Acquire) == ticket
    }

    pub(crate) fn emit(&self, event: CoreEvent) {
        // No subscribers is fine.
        let _ = self.events.emit(event);
    }

    /// Log and publish a rejected device command. The session state keeps
    /// whatever the caller asked for.
    pub(crate) fn report_device_error(&self, operation: &str, err: &BridgeError) {
        warn!(operation, error = %err, "audio device rejected command");
        self.emit(CoreEvent::Playback(PlaybackEvent::DeviceError {
            operation: operation.to_string(),
            message: err.to_string(),
        }));
    }
}

/// Resets the `initializing` flag when an initialize call ends, however it ends.
struct InitGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

struct LoadedChannels {
    background: Arc<dyn AudioChannel>,
    /// Volume the background channel was created with.
    background_volume: f32,
    voiceover: Option<Arc<dyn AudioChannel>>,
}

/// Owner of the background and voiceover channels.
///
/// Cloning is cheap; every clone refers to the same session.
#[derive(Clone)]
pub struct AudioSession {
    shared: Arc<SessionShared>,
}

impl AudioSession {
    /// Create an uninitialized session with its own event bus.
    pub fn new(config: &AudioConfig) -> Self {
        Self::with_event_bus(config, EventBus::new(config.event_buffer_size))
    }

    /// Create an uninitialized session publishing on an existing bus.
    pub fn with_event_bus(config: &AudioConfig, events: EventBus) -> Self {
        let shared = SessionShared {
            device: Arc::clone(&config.device),
            background_asset: config.background_asset.clone(),
            voiceover_asset: config.voiceover_asset.clone(),
            voiceover_volume: config.voiceover_volume,
            output_mode: config.output_mode,
            store: StateStore::new(config.initial_volume, config.start_enabled),
            events,
            channels: Mutex::new(Channels::default()),
            voiceover_lock: tokio::sync::Mutex::new(()),
            output_configured: AtomicBool::new(false),
            initializing: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            transition: AtomicU64::new(0),
        };

        Self {
            shared: Arc::new(shared),
        }
    }

    pub fn playback(&self) -> PlaybackController {
        PlaybackController::new(Arc::clone(&self.shared))
    }

    pub fn voiceover(&self) -> VoiceoverController {
        VoiceoverController::new(Arc::clone(&self.shared))
    }

    pub fn state(&self) -> &StateStore {
        &self.shared.store
    }

    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    /// `true` once the background channel is installed.
    pub fn is_initialized(&self) -> bool {
        self.shared.background().is_some()
    }

    /// Configure the output mode and load both channels.
    ///
    /// Repeated or concurrent calls are no-ops while a background channel
    /// exists or another call is in flight. The output mode is applied at
    /// most once per session, even across retries.
    ///
    /// # Errors
    ///
    /// Returns the device failure that abandoned the attempt. Nothing is
    /// retained in that case and a later call may retry. The failure is also
    /// logged and published as [`SessionEvent::InitializationFailed`].
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        if self.is_initialized() {
            debug!("audio session already initialized");
            return Ok(());
        }

        let Some(_guard) = InitGuard::acquire(&self.shared.initializing) else {
            debug!("audio session initialization already in progress");
            return Ok(());
        };

        let generation = self.shared.generation.load(Ordering::Acquire);

        match self.load_channels().await {
            Ok(loaded) => {
                self.install(loaded, generation).await;
                Ok(())
            }
            Err(err) => {
                error!(error = %err, retryable = err.is_transient(), "audio session initialization failed");
                self.shared
                    .emit(CoreEvent::Session(SessionEvent::InitializationFailed {
                        message: err.to_string(),
                    }));
                Err(err)
            }
        }
    }

    async fn load_channels(&self) -> Result<LoadedChannels> {
        let shared = &self.shared;

        if !shared.output_configured.load(Ordering::Acquire) {
            shared
                .device
                .configure_output_mode(shared.output_mode)
                .await
                .map_err(PlaybackError::OutputMode)?;
            shared.output_configured.store(true, Ordering::Release);
            debug!(mode = ?shared.output_mode, "audio output mode configured");
        }

        let background_volume = shared.store.volume();
        let background = shared
            .device
            .load(
                &shared.background_asset,
                LoadOptions::default()
                    .with_should_play(false)
                    .with_looping(true)
                    .with_volume(background_volume),
            )
            .await
            .map_err(|source| PlaybackError::AssetLoad {
                asset: shared.background_asset.describe(),
                source,
            })?;

        let voiceover = match &shared.voiceover_asset {
            Some(asset) => {
                let options = LoadOptions::default()
                    .with_should_play(false)
                    .with_looping(false)
                    .with_volume(shared.voiceover_volume);
                match shared.device.load(asset, options).await {
                    Ok(channel) => Some(channel),
                    Err(source) => {
                        release(&background, "background").await;
                        return Err(PlaybackError::AssetLoad {
                            asset: asset.describe(),
                            source,
                        });
                    }
                }
            }
            None => None,
        };

        Ok(LoadedChannels {
            background,
            background_volume,
            voiceover,
        })
    }

    async fn install(&self, loaded: LoadedChannels, generation: u64) {
        let shared = &self.shared;

        let installed = {
            let mut channels = shared.channels.lock();
            let torn_down = shared.generation.load(Ordering::Acquire) != generation;
            if torn_down || channels.background.is_some() {
                false
            } else {
                channels.listener = Some(FinishListener::attach(
                    Arc::clone(&loaded.background),
                    Arc::downgrade(shared),
                ));
                channels.background = Some(Arc::clone(&loaded.background));
                channels.voiceover = loaded.voiceover.clone();
                true
            }
        };

        if !installed {
            info!("audio session torn down while loading, releasing channels");
            release(&loaded.background, "background").await;
            if let Some(voiceover) = &loaded.voiceover {
                release(voiceover, "voiceover").await;
            }
            return;
        }

        // A set_volume issued while the asset was loading only reached the store.
        let current_volume = shared.store.volume();
        if current_volume != loaded.background_volume
            && shared.is_current_background(&loaded.background)
        {
            if let Err(err) = loaded.background.set_volume(current_volume).await {
                shared.report_device_error("set_volume", &err);
            }
        }

        let voiceover_loaded = loaded.voiceover.is_some();
        info!(
            background = %shared.background_asset.describe(),
            voiceover_loaded,
            "audio session initialized"
        );
        shared.emit(CoreEvent::Session(SessionEvent::Initialized { voiceover_loaded }));
    }

    /// Unload both channels, tolerating either or both being absent.
    #[instrument(skip(self))]
    pub async fn teardown(&self) {
        let shared = &self.shared;
        shared.generation.fetch_add(1, Ordering::AcqRel);
        shared.begin_transition();

        let (background, voiceover, listener) = {
            let mut channels = shared.channels.lock();
            (
                channels.background.take(),
                channels.voiceover.take(),
                channels.listener.take(),
            )
        };

        // Remove the status subscription before the channel goes away.
        drop(listener);
        shared.store.set_status(PlaybackStatus::Stopped);

        if background.is_none() && voiceover.is_none() {
            debug!("audio session teardown: nothing loaded");
            return;
        }

        if let Some(channel) = &background {
            release(channel, "background").await;
        }
        if let Some(channel) = &voiceover {
            release(channel, "voiceover").await;
        }

        info!("audio session torn down");
        shared.emit(CoreEvent::Session(SessionEvent::TornDown));
    }
}

impl std::fmt::Debug for AudioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSession")
            .field("initialized", &self.is_initialized())
            .field("state", &self.shared.store.snapshot())
            .finish()
    }
}

async fn release(channel: &Arc<dyn AudioChannel>, role: &str) {
    if let Err(err) = channel.unload().await {
        warn!(role, error = %err, "failed to unload audio channel");
    }
}
