//! One-shot voiceover playback.

use crate::session::SessionShared;

use core_runtime::events::{CoreEvent, VoiceoverEvent};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Plays the voiceover channel from the beginning.
///
/// Independent of the background loop: not gated by `is_enabled` and never
/// touched by background volume changes.
#[derive(Clone)]
pub struct VoiceoverController {
    shared: Arc<SessionShared>,
}

impl VoiceoverController {
    pub(crate) fn new(shared: Arc<SessionShared>) -> Self {
        Self { shared }
    }

    /// Stop any in-flight voiceover, then start it again from the top.
    ///
    /// Calls are serialized so at most one instance is ever audible. No-op
    /// when no voiceover channel is loaded.
    #[instrument(skip(self))]
    pub async fn play_voiceover(&self) {
        let shared = &self.shared;

        let Some(channel) = shared.voiceover() else {
            debug!("no voiceover channel, ignoring play");
            return;
        };

        let _serial = shared.voiceover_lock.lock().await;
        if !shared.is_current_voiceover(&channel) {
            debug!("voiceover channel unloaded while queued");
            return;
        }

        if let Err(err) = channel.stop().await {
            shared.report_device_error("voiceover_stop", &err);
        }
        if !shared.is_current_voiceover(&channel) {
            debug!("voiceover channel unloaded during stop");
            return;
        }

        match channel.play().await {
            Ok(()) => {
                info!("voiceover started");
                shared.emit(CoreEvent::Voiceover(VoiceoverEvent::Started));
            }
            Err(_) if !shared.is_current_voiceover(&channel) => {
                debug!("voiceover channel unloaded during play");
            }
            Err(err) => {
                warn!(error = %err, "voiceover playback failed");
                shared.emit(CoreEvent::Voiceover(VoiceoverEvent::Failed {
                    message: err.to_string(),
                }));
            }
        }
    }

    /// `true` when a voiceover channel is loaded.
    pub fn is_available(&self) -> bool {
        self.shared.voiceover().is_some()
    }
}

impl std::fmt::Debug for VoiceoverController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceoverController")
            .field("available", &self.is_available())
            .finish()
    }
}
