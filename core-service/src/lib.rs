//! Consumer-facing façade for background music and voiceover.
//!
//! A host creates one [`MusicProvider`] for the lifetime of its audio scope
//! and hands [`MusicContext`] clones to whichever components need audio
//! control. Contexts are cheap, weak handles: once the provider is shut down
//! or dropped, every context operation fails with
//! [`CoreError::NoActiveSession`] instead of quietly returning defaults.
//!
//! ```ignore
//! use core_service::{AudioAsset, AudioConfig, MusicProvider};
//!
//! let provider = MusicProvider::new(
//!     AudioConfig::builder()
//!         .device(device)
//!         .background_asset(AudioAsset::bundled("theme.mp3"))
//!         .voiceover_asset(AudioAsset::bundled("welcome.mp3"))
//!         .build()?,
//! );
//!
//! let music = provider.context();
//! music.initialize_music().await?;
//! music.play_music().await?;
//! assert!(music.is_playing()?);
//!
//! provider.shutdown().await;
//! assert!(music.is_playing().is_err());
//! ```

pub mod error;

pub use error::{CoreError, Result};

pub use bridge_traits::{AudioAsset, AudioChannel, AudioDevice, OutputMode};
pub use core_playback::{PlaybackStatus, SessionSnapshot};
pub use core_runtime::config::{AudioConfig, AudioConfigBuilder};
pub use core_runtime::events::{CoreEvent, EventStream};

use core_playback::AudioSession;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Owner of the session scope.
///
/// Dropping the provider without [`shutdown`](Self::shutdown) still unloads
/// the channels when a tokio runtime is available.
pub struct MusicProvider {
    session: Option<Arc<AudioSession>>,
}

impl MusicProvider {
    pub fn new(config: AudioConfig) -> Self {
        info!(?config, "music provider created");
        Self {
            session: Some(Arc::new(AudioSession::new(&config))),
        }
    }

    /// Build the configuration and create the provider in one step.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Runtime`] if the configuration is incomplete or invalid.
    pub fn from_builder(builder: AudioConfigBuilder) -> Result<Self> {
        Ok(Self::new(builder.build()?))
    }

    /// A handle for one consumer. Valid until the provider ends.
    pub fn context(&self) -> MusicContext {
        MusicContext {
            session: self.session.as_ref().map(Arc::downgrade).unwrap_or_default(),
        }
    }

    /// End the scope: unload both channels and invalidate every context.
    pub async fn shutdown(mut self) {
        if let Some(session) = self.session.take() {
            session.teardown().await;
            debug!("music provider shut down");
        }
    }
}

impl Drop for MusicProvider {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        let session = AudioSession::clone(&session);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { session.teardown().await });
            }
            Err(_) => {
                warn!("music provider dropped outside a tokio runtime; channels were not unloaded");
            }
        }
    }
}

impl std::fmt::Debug for MusicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MusicProvider")
            .field("session", &self.session)
            .finish()
    }
}

/// Per-consumer access to the music session.
///
/// Every method fails with [`CoreError::NoActiveSession`] once the owning
/// provider has ended.
#[derive(Clone, Debug)]
pub struct MusicContext {
    session: Weak<AudioSession>,
}

impl MusicContext {
    fn session(&self) -> Result<Arc<AudioSession>> {
        self.session.upgrade().ok_or_else(|| {
            error!("music context used outside an active MusicProvider scope");
            CoreError::NoActiveSession
        })
    }

    /// `true` while the provider that issued this context is alive.
    pub fn is_active(&self) -> bool {
        self.session.strong_count() > 0
    }

    pub fn is_playing(&self) -> Result<bool> {
        Ok(self.session()?.state().is_playing())
    }

    pub fn volume(&self) -> Result<f32> {
        Ok(self.session()?.state().volume())
    }

    pub fn is_enabled(&self) -> Result<bool> {
        Ok(self.session()?.state().is_enabled())
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        Ok(self.session()?.state().snapshot())
    }

    /// Receiver woken whenever `is_playing`, `volume` or `is_enabled` changes.
    pub fn subscribe(&self) -> Result<watch::Receiver<SessionSnapshot>> {
        Ok(self.session()?.state().subscribe())
    }

    /// Session and playback transitions published after this call.
    pub fn events(&self) -> Result<EventStream> {
        Ok(EventStream::new(self.session()?.events().subscribe()))
    }

    /// Load the channels. Safe to call repeatedly; a failed attempt may be retried.
    ///
    /// # Errors
    ///
    /// [`CoreError::Playback`] when the device rejected initialization.
    pub async fn initialize_music(&self) -> Result<()> {
        self.session()?.initialize().await?;
        Ok(())
    }

    pub async fn play_music(&self) -> Result<()> {
        self.session()?.playback().play().await;
        Ok(())
    }

    pub async fn pause_music(&self) -> Result<()> {
        self.session()?.playback().pause().await;
        Ok(())
    }

    pub async fn stop_music(&self) -> Result<()> {
        self.session()?.playback().stop().await;
        Ok(())
    }

    pub async fn restart_music(&self) -> Result<()> {
        self.session()?.playback().restart().await;
        Ok(())
    }

    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        self.session()?.playback().set_volume(volume).await;
        Ok(())
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.session()?.playback().set_enabled(enabled).await;
        Ok(())
    }

    pub async fn play_voiceover(&self) -> Result<()> {
        self.session()?.voiceover().play_voiceover().await;
        Ok(())
    }
}
