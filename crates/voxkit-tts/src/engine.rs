//! Synthesis engine abstraction and terminal synthesis events

use crate::error::SynthResult;
use crate::types::{AudioClip, ConcreteVoice, SpeechParams};
use async_trait::async_trait;

/// Terminal outcome of a synthesis request.
///
/// Engines resolve each `speak` call to exactly one of these. The lifecycle
/// "started" signal belongs to the caller that issued the request, not to the
/// engine.
#[derive(Debug, Clone)]
pub enum SynthesisEvent {
    /// Synthesis completed. `audio` is `None` on hosts whose engine speaks
    /// through a device it owns and yields no capturable bytes.
    Completed {
        synthesis_id: u64,
        audio: Option<AudioClip>,
    },
    /// Synthesis failed with an engine-reported reason
    Failed { synthesis_id: u64, reason: String },
    /// Synthesis was cancelled before completion
    Cancelled { synthesis_id: u64 },
}

/// Core synthesis engine interface.
///
/// Methods take `&self`: implementations carry interior mutability so that
/// `cancel` can interrupt an in-flight `speak` from another task.
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Engine name/identifier
    fn name(&self) -> &str;

    /// Check if the engine is usable on this host
    async fn is_available(&self) -> bool;

    /// List the voices the engine currently exposes.
    ///
    /// The set can change at runtime on some hosts; callers fetch freshly
    /// per request rather than caching.
    async fn list_voices(&self) -> SynthResult<Vec<ConcreteVoice>>;

    /// Synthesize `text` with the given concrete voice and prosody.
    ///
    /// Suspends until the engine resolves the request to a terminal event.
    async fn speak(
        &self,
        text: &str,
        voice: &ConcreteVoice,
        params: SpeechParams,
    ) -> SynthResult<SynthesisEvent>;

    /// Abort any in-flight synthesis. A pending `speak` resolves to
    /// `SynthesisEvent::Cancelled`.
    async fn cancel(&self) -> SynthResult<()>;
}
