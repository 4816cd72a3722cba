//! Session error taxonomy

use thiserror::Error;
use voxkit_audio::AudioError;
use voxkit_tts::SynthError;

/// Errors surfaced by the session core.
///
/// Validation and single-flight errors are returned synchronously before any
/// engine work starts; engine and primitive failures surface as a failed
/// generation result. Resource-release failures are logged where they occur
/// and never propagate through this type.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Input text was empty or whitespace-only
    #[error("input text is empty")]
    EmptyInput,

    /// A generation is already in flight; concurrent requests are rejected,
    /// not queued
    #[error("a generation is already in progress")]
    GenerationInProgress,

    /// The engine exposed no concrete voices
    #[error("no synthesis voices available")]
    NoVoicesAvailable,

    /// The engine failed to synthesize
    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),

    /// The audio primitive never reported metadata within the bound
    #[error("timed out waiting for audio metadata")]
    LoadTimeout,

    /// The generation was cancelled before completion
    #[error("generation was cancelled")]
    Cancelled,

    /// No artifact with this id exists in the history
    #[error("artifact not found: {0}")]
    ArtifactNotFound(u64),

    /// Audio primitive error
    #[error("audio output error: {0}")]
    Audio(#[from] AudioError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<SynthError> for SessionError {
    fn from(e: SynthError) -> Self {
        SessionError::SynthesisFailed(e.to_string())
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
