//! Error types for the audio primitive layer

use thiserror::Error;

/// Audio primitive error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// An operation needed a loaded source and none was bound
    #[error("no media loaded")]
    NoMediaLoaded,

    /// The bound media handle was released out from under the output
    #[error("media resource already released")]
    MediaReleased,

    /// `release` called on a handle that was already released
    #[error("resource handle {0} already released")]
    AlreadyReleased(u64),

    /// Media bytes could not be decoded
    #[error("failed to decode media: {0}")]
    Decode(String),
}

/// Result type for audio primitive operations
pub type AudioResult<T> = Result<T, AudioError>;
