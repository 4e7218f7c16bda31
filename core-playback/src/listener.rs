//! Finish-notification listener for the background channel.
//!
//! The device invokes status callbacks from its own context. The callback only
//! forwards each [`ChannelStatus`] into a queue; a spawned task drains the
//! queue and hands the notification to [`PlaybackController::handle_status`].
//! Restarts therefore always run on the async runtime, one at a time, in the
//! order the device reported them.

use crate::controller::PlaybackController;
use crate::session::SessionShared;

use bridge_traits::{AudioChannel, ChannelId, ChannelStatus};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Status subscription on one background channel.
///
/// Dropping the listener clears the channel's callback slot and stops the
/// forwarding task.
pub(crate) struct FinishListener {
    channel: Arc<dyn AudioChannel>,
    task: JoinHandle<()>,
}

impl FinishListener {
    /// Subscribe to `channel`. Must be called from within a tokio runtime.
    pub(crate) fn attach(channel: Arc<dyn AudioChannel>, session: Weak<SessionShared>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<ChannelStatus>();

        channel.set_status_callback(Some(Box::new(move |status| {
            // The receiver is gone once the listener was dropped.
            let _ = tx.send(status);
        })));

        let task = tokio::spawn(forward(channel.id(), rx, session));
        debug!(channel = %channel.id().as_uuid(), "finish listener attached");

        Self { channel, task }
    }
}

async fn forward(
    channel_id: ChannelId,
    mut rx: mpsc::UnboundedReceiver<ChannelStatus>,
    session: Weak<SessionShared>,
) {
    while let Some(status) = rx.recv().await {
        trace!(?status, "background channel status");

        let Some(shared) = session.upgrade() else {
            break;
        };

        let installed = shared
            .background()
            .is_some_and(|current| current.id() == channel_id);
        if !installed {
            debug!("ignoring status from a replaced background channel");
            continue;
        }

        PlaybackController::new(shared).handle_status(status).await;
    }
}

impl Drop for FinishListener {
    fn drop(&mut self) {
        self.channel.set_status_callback(None);
        self.task.abort();
    }
}
