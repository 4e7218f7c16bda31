//! # Event Bus System
//!
//! Broadcasts session and playback notifications using `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The playback core keeps its observable fields in a state store; the event
//! bus carries the *transitions* that produced them (a restart after a natural
//! finish, a device call the platform rejected, ...). Hosts subscribe to drive
//! analytics, diagnostics overlays or UI toasts without polling.
//!
//! ```text
//! ┌──────────────────┐   emit   ┌───────────┐  subscribe  ┌────────────┐
//! │ AudioSession     ├─────────>│           ├────────────>│ Subscriber │
//! └──────────────────┘          │ EventBus  │             └────────────┘
//! ┌──────────────────┐   emit   │ (broadcast│  subscribe  ┌────────────┐
//! │ Playback / Voice ├─────────>│  channel) ├────────────>│ Subscriber │
//! └──────────────────┘          └───────────┘             └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Playback(PlaybackEvent::Started)).ok();
//! assert_eq!(rx.recv().await.unwrap(), CoreEvent::Playback(PlaybackEvent::Started));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events and may continue.
//! - **`RecvError::Closed`**: every sender was dropped; the session is gone.
//!
//! Emitting with no subscribers returns an error the core deliberately ignores.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Session(SessionEvent),
    Playback(PlaybackEvent),
    Voiceover(VoiceoverEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Session(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Voiceover(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Session(SessionEvent::InitializationFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::DeviceError { .. }) => EventSeverity::Warning,
            CoreEvent::Voiceover(VoiceoverEvent::Failed { .. }) => EventSeverity::Warning,
            CoreEvent::Session(_) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Restarted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Session Events
// ============================================================================

/// Lifecycle of the audio session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// Output mode applied and channels loaded.
    Initialized {
        /// Whether a voiceover channel was loaded alongside the background loop.
        voiceover_loaded: bool,
    },
    /// Initialization was abandoned; the session stays uninitialized.
    InitializationFailed {
        message: String,
    },
    /// Channels unloaded.
    TornDown,
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::Initialized { .. } => "Audio session initialized",
            SessionEvent::InitializationFailed { .. } => "Audio session initialization failed",
            SessionEvent::TornDown => "Audio session torn down",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Why the background loop was restarted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RestartReason {
    /// An explicit restart request.
    Requested,
    /// Recovery after the device reported a natural end of track.
    Finished,
}

/// Background-loop transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    Started,
    Paused,
    Stopped,
    Restarted {
        reason: RestartReason,
    },
    /// The device reported a natural end of track.
    Finished {
        /// Whether looping was re-engaged.
        restarted: bool,
    },
    VolumeChanged {
        volume: f32,
    },
    EnabledChanged {
        enabled: bool,
    },
    /// A device call was rejected. Session state keeps the caller's intent.
    DeviceError {
        operation: String,
        message: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Started => "Background music started",
            PlaybackEvent::Paused => "Background music paused",
            PlaybackEvent::Stopped => "Background music stopped",
            PlaybackEvent::Restarted { .. } => "Background music restarted",
            PlaybackEvent::Finished { .. } => "Background track finished",
            PlaybackEvent::VolumeChanged { .. } => "Background volume changed",
            PlaybackEvent::EnabledChanged { .. } => "Background music enablement changed",
            PlaybackEvent::DeviceError { .. } => "Audio device rejected a command",
        }
    }
}

// ============================================================================
// Voiceover Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum VoiceoverEvent {
    Started,
    Failed { message: String },
}

impl VoiceoverEvent {
    fn description(&self) -> &str {
        match self {
            VoiceoverEvent::Started => "Voiceover started",
            VoiceoverEvent::Failed { .. } => "Voiceover playback failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus yields another producer for the same channel; every
/// [`EventBus::subscribe`] call creates an independent receiver that only sees
/// events emitted after it was created.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    ///
    /// `capacity` is the number of events buffered per subscriber before it
    /// starts receiving `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when nobody is listening.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional predicate.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let playback_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Playback(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv()`/`try_recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Returns `None` if no matching event is currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
