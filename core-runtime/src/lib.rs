//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the audio crates:
//! - Logging and tracing bootstrap
//! - Audio configuration with fail-fast validation
//! - Event bus for session and playback notifications
//!
//! ## Overview
//!
//! Nothing in here knows about the playback state machine itself. The
//! `core-playback` crate builds on these pieces: it reads an [`AudioConfig`],
//! reports through `tracing`, and publishes [`CoreEvent`]s on the [`EventBus`].

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{AudioConfig, AudioConfigBuilder};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, EventStream};
