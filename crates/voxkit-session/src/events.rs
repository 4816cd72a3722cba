//! Session lifecycle events
//!
//! Observers (a UI, a test harness) subscribe to these over a broadcast
//! channel. Progress values are an indicative heartbeat, not a measurement:
//! they stay at or below 90 until the engine actually completes, then jump
//! to 100.

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    GenerationStarted {
        generation_id: u64,
    },
    GenerationProgress {
        generation_id: u64,
        percent: u8,
    },
    GenerationCompleted {
        generation_id: u64,
        artifact_id: u64,
    },
    /// The attempt failed; observers reset their transient indicators
    GenerationFailed {
        generation_id: u64,
        reason: String,
    },
    GenerationCancelled {
        generation_id: u64,
    },
}
