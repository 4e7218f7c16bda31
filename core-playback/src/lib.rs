//! # Background Music & Voiceover Playback
//!
//! Drives two device channels on behalf of the application.
//!
//! ## Overview
//!
//! This module handles:
//! - Session lifecycle: output mode, loading and unloading channels ([`AudioSession`])
//! - The background loop state machine and its enable gate ([`PlaybackController`])
//! - One-shot voiceover replay ([`VoiceoverController`])
//! - Perpetual looping across natural end-of-track notifications
//! - Observable session fields ([`StateStore`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::AudioSession;
//!
//! let session = AudioSession::new(&config);
//! session.initialize().await?;
//!
//! let playback = session.playback();
//! playback.play().await;
//! playback.set_volume(0.4).await;
//! session.voiceover().play_voiceover().await;
//!
//! assert!(session.state().is_playing());
//! session.teardown().await;
//! ```

pub mod controller;
pub mod error;
mod listener;
pub mod session;
pub mod state;
pub mod voiceover;

pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use session::AudioSession;
pub use state::{PlaybackStatus, SessionSnapshot, StateStore};
pub use voiceover::VoiceoverController;
