//! # Background Playback Controller
//!
//! State machine over [`PlaybackStatus`] for the background loop, with the
//! `is_enabled` flag as an orthogonal gate:
//!
//! ```text
//!            play (enabled)              pause
//!  Stopped ─────────────────> Playing ─────────> Paused
//!     ^                         │  ^               │
//!     └──────── stop ───────────┘  └── play ───────┘
//! ```
//!
//! `restart` goes through `Stopped` back to `Playing`; it is both an explicit
//! request and the recovery action for a natural end of track.
//!
//! ## Device failures
//!
//! Commands never return errors. A rejected device call is logged at `warn`
//! and published as [`PlaybackEvent::DeviceError`]; the requested volume and
//! enabled flag stay as set. `Playing` is only committed after the device
//! accepted `play`, so `is_playing` never claims audio the device refused.

use crate::session::SessionShared;
use crate::state::PlaybackStatus;

use bridge_traits::{AudioChannel, ChannelStatus};
use core_runtime::events::{CoreEvent, PlaybackEvent, RestartReason};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Commands for the background loop.
#[derive(Clone)]
pub struct PlaybackController {
    shared: Arc<SessionShared>,
}

impl PlaybackController {
    pub(crate) fn new(shared: Arc<SessionShared>) -> Self {
        Self { shared }
    }

    /// Start the background loop.
    ///
    /// No-op without a background channel, while disabled, or when already
    /// playing. Looping is re-asserted before every start.
    #[instrument(skip(self))]
    pub async fn play(&self) {
        let shared = &self.shared;

        if !shared.store.is_enabled() {
            debug!("background music disabled, ignoring play");
            return;
        }
        if shared.store.is_playing() {
            return;
        }
        let Some(channel) = shared.background() else {
            debug!("no background channel, ignoring play");
            return;
        };

        let ticket = shared.begin_transition();

        if let Err(err) = channel.set_looping(true).await {
            shared.report_device_error("set_looping", &err);
        }
        if !self.still_wanted(&channel, ticket) {
            debug!("play superseded before start");
            return;
        }

        if let Err(err) = channel.play().await {
            shared.report_device_error("play", &err);
            return;
        }

        if !self.still_wanted(&channel, ticket) {
            debug!("play superseded after start");
            self.reconcile_superseded(&channel).await;
            return;
        }

        if shared.store.set_status(PlaybackStatus::Playing) {
            info!("background music playing");
            shared.emit(CoreEvent::Playback(PlaybackEvent::Started));
        }
    }

    /// Pause the background loop, keeping its position. Idempotent.
    #[instrument(skip(self))]
    pub async fn pause(&self) {
        self.halt(PlaybackStatus::Paused).await;
    }

    /// Stop the background loop and rewind it. Idempotent.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        self.halt(PlaybackStatus::Stopped).await;
    }

    /// Stop, re-assert looping and start again from the beginning.
    pub async fn restart(&self) {
        self.restart_with(RestartReason::Requested).await;
    }

    #[instrument(skip(self))]
    async fn restart_with(&self, reason: RestartReason) {
        let shared = &self.shared;

        if !shared.store.is_enabled() {
            debug!("background music disabled, ignoring restart");
            return;
        }
        let Some(channel) = shared.background() else {
            debug!("no background channel, ignoring restart");
            return;
        };

        let ticket = shared.begin_transition();
        shared.store.set_status(PlaybackStatus::Stopped);

        if let Err(err) = channel.stop().await {
            shared.report_device_error("stop", &err);
        }
        if !self.still_wanted(&channel, ticket) {
            return;
        }

        if let Err(err) = channel.set_looping(true).await {
            shared.report_device_error("set_looping", &err);
        }
        if !self.still_wanted(&channel, ticket) {
            return;
        }

        if let Err(err) = channel.play().await {
            shared.report_device_error("play", &err);
            return;
        }

        if !self.still_wanted(&channel, ticket) {
            debug!("restart superseded after start");
            self.reconcile_superseded(&channel).await;
            return;
        }

        shared.store.set_status(PlaybackStatus::Playing);
        info!(?reason, "background music restarted");
        shared.emit(CoreEvent::Playback(PlaybackEvent::Restarted { reason }));
    }

    /// Apply a status notification from the background channel.
    ///
    /// A natural end of track restarts the loop while enabled and leaves it
    /// stopped otherwise. Other notifications are ignored.
    pub async fn handle_status(&self, status: ChannelStatus) {
        if !status.did_just_finish {
            return;
        }

        let shared = &self.shared;
        let restarted = if shared.store.is_enabled() {
            self.restart_with(RestartReason::Finished).await;
            shared.store.is_playing()
        } else {
            debug!("background track finished while disabled");
            shared.store.set_status(PlaybackStatus::Stopped);
            false
        };

        shared.emit(CoreEvent::Playback(PlaybackEvent::Finished { restarted }));
    }

    /// Set the background volume.
    ///
    /// The stored value changes even without a channel so the next load picks
    /// it up. Values are clamped to `0.0..=1.0`; non-finite values are ignored.
    #[instrument(skip(self))]
    pub async fn set_volume(&self, volume: f32) {
        let shared = &self.shared;

        if !volume.is_finite() {
            warn!(volume, "ignoring non-finite volume");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);

        if shared.store.set_volume(volume) {
            debug!(volume, "background volume changed");
            shared.emit(CoreEvent::Playback(PlaybackEvent::VolumeChanged { volume }));
        }

        if let Some(channel) = shared.background() {
            if let Err(err) = channel.set_volume(volume).await {
                shared.report_device_error("set_volume", &err);
            }
        }
    }

    /// Gate background playback.
    ///
    /// Disabling pauses the loop. Enabling only lifts the gate; playback
    /// resumes on the next explicit [`play`](Self::play).
    #[instrument(skip(self))]
    pub async fn set_enabled(&self, enabled: bool) {
        let shared = &self.shared;

        if shared.store.set_enabled(enabled) {
            info!(enabled, "background music enablement changed");
            shared.emit(CoreEvent::Playback(PlaybackEvent::EnabledChanged { enabled }));
        }

        if !enabled {
            self.pause().await;
        }
    }

    async fn halt(&self, status: PlaybackStatus) {
        let shared = &self.shared;

        let Some(channel) = shared.background() else {
            return;
        };

        shared.begin_transition();
        if shared.store.set_status(status) {
            let event = match status {
                PlaybackStatus::Paused => PlaybackEvent::Paused,
                _ => PlaybackEvent::Stopped,
            };
            debug!(?status, "background music halted");
            shared.emit(CoreEvent::Playback(event));
        }

        let result = match status {
            PlaybackStatus::Paused => channel.pause().await,
            _ => channel.stop().await,
        };
        if let Err(err) = result {
            let operation = if status == PlaybackStatus::Paused {
                "pause"
            } else {
                "stop"
            };
            shared.report_device_error(operation, &err);
        }
    }

    /// Undo a device `play` whose transition was overtaken while it was in
    /// flight. The channel is brought back to the stored status unless a
    /// later start already committed `Playing`.
    async fn reconcile_superseded(&self, channel: &Arc<dyn AudioChannel>) {
        let shared = &self.shared;

        if !shared.is_current_background(channel) {
            return;
        }

        let (operation, result) = match shared.store.status() {
            PlaybackStatus::Playing => return,
            PlaybackStatus::Paused => ("pause", channel.pause().await),
            PlaybackStatus::Stopped => ("stop", channel.stop().await),
        };
        if let Err(err) = result {
            shared.report_device_error(operation, &err);
        }
    }

    /// A start may still commit: no later transition, same channel, still enabled.
    fn still_wanted(&self, channel: &Arc<dyn AudioChannel>, ticket: u64) -> bool {
        self.shared.is_latest_transition(ticket)
            && self.shared.is_current_background(channel)
            && self.shared.store.is_enabled()
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("status", &self.shared.store.status())
            .finish()
    }
}
