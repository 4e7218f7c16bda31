//! Observable session state.
//!
//! [`StateStore`] holds the three fields consumers render (`is_playing`,
//! `volume`, `is_enabled`) behind a `tokio::sync::watch` channel. Writers only
//! wake subscribers when a field actually changes.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Status of the background loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Point-in-time copy of the session fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: PlaybackStatus,
    /// Background volume in `0.0..=1.0`. Never applied to the voiceover.
    pub volume: f32,
    pub is_enabled: bool,
}

impl SessionSnapshot {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}

/// Shared, observable session state.
#[derive(Debug)]
pub struct StateStore {
    sender: watch::Sender<SessionSnapshot>,
}

impl StateStore {
    pub fn new(volume: f32, is_enabled: bool) -> Self {
        let (sender, _) = watch::channel(SessionSnapshot {
            status: PlaybackStatus::Stopped,
            volume,
            is_enabled,
        });
        Self { sender }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        *self.sender.borrow()
    }

    /// Receiver woken whenever a field changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.sender.subscribe()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.sender.borrow().status
    }

    pub fn is_playing(&self) -> bool {
        self.sender.borrow().is_playing()
    }

    pub fn volume(&self) -> f32 {
        self.sender.borrow().volume
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.borrow().is_enabled
    }

    /// Returns `true` if the status changed.
    pub(crate) fn set_status(&self, status: PlaybackStatus) -> bool {
        self.sender.send_if_modified(|snapshot| {
            if snapshot.status == status {
                return false;
            }
            snapshot.status = status;
            true
        })
    }

    pub(crate) fn set_volume(&self, volume: f32) -> bool {
        self.sender.send_if_modified(|snapshot| {
            if snapshot.volume == volume {
                return false;
            }
            snapshot.volume = volume;
            true
        })
    }

    pub(crate) fn set_enabled(&self, is_enabled: bool) -> bool {
        self.sender.send_if_modified(|snapshot| {
            if snapshot.is_enabled == is_enabled {
                return false;
            }
            snapshot.is_enabled = is_enabled;
            true
        })
    }
}
