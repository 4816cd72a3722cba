//! Error types for speech synthesis

use thiserror::Error;

/// Synthesis error types
#[derive(Error, Debug)]
pub enum SynthError {
    /// Engine is not available or not installed
    #[error("synthesis engine not available: {0}")]
    EngineNotAvailable(String),

    /// Voice not found or not supported
    #[error("voice not found: {0}")]
    VoiceNotFound(String),

    /// Synthesis failed
    #[error("synthesis failed: {0}")]
    SynthesisError(String),

    /// Invalid text input
    #[error("invalid text input: {0}")]
    InvalidInput(String),

    /// IO error (process spawning, pipe reads)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for synthesis operations
pub type SynthResult<T> = Result<T, SynthError>;
