use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// A context was used after its provider ended. This is a wiring bug in
    /// the caller, not a runtime condition.
    #[error("No active music session: the MusicProvider owning this context has been shut down")]
    NoActiveSession,

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
