//! Marker trait that keeps bridge bounds in one place.
//!
//! Device callbacks may fire from an audio thread owned by the host, so every
//! bridge object must be shareable across threads. Bridge traits require this
//! marker instead of spelling out `Send + Sync` on each definition.

/// Marker trait implemented for every `Send + Sync` type.
pub trait PlatformSendSync: Send + Sync {}

impl<T> PlatformSendSync for T where T: Send + Sync {}
