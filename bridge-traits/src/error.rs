use thiserror::Error;

/// Errors surfaced by host-provided audio bridges.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Audio asset not found: {0}")]
    AssetNotFound(String),

    #[error("Audio channel already unloaded")]
    Unloaded,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
