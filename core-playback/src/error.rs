//! # Playback Error Types
//!
//! Errors surfaced by the audio session. Only initialization reports errors
//! to its caller; runtime device failures are logged and published as events
//! instead (see [`crate::PlaybackController`]).

use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The device rejected the requested output mode.
    #[error("Failed to configure audio output mode: {0}")]
    OutputMode(#[source] BridgeError),

    /// An asset could not be loaded into a channel.
    #[error("Failed to load audio asset {asset}: {source}")]
    AssetLoad {
        asset: String,
        #[source]
        source: BridgeError,
    },
}

impl PlaybackError {
    /// Returns `true` if retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        let source = match self {
            PlaybackError::OutputMode(source) | PlaybackError::AssetLoad { source, .. } => source,
        };
        matches!(
            source,
            BridgeError::NotAvailable(_) | BridgeError::OperationFailed(_) | BridgeError::Io(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
