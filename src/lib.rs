//! Workspace placeholder crate.
//!
//! Host applications can depend on `soundstage-workspace` and pick the layer
//! they need through features: `service` (default) exposes the
//! [`MusicProvider`](core_service::MusicProvider) façade, while `playback`
//! exposes the lower-level session and controllers directly.

#[cfg(feature = "service")]
pub use core_service as service;

#[cfg(feature = "playback")]
pub use core_playback as playback;
