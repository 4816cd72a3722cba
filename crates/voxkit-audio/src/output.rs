//! Audio output abstraction and playback events

use crate::error::AudioResult;
use crate::handle::MediaHandle;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Playback lifecycle events emitted by an audio output.
///
/// These events are the single source of truth for playback state: whoever
/// mirrors them must not also set playing/position flags optimistically, or
/// the mirror diverges from the primitive when a request is denied.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioOutputEvent {
    /// Source metadata became available. `load_id` is the token returned by
    /// the `load` call this event answers, so listeners can discard metadata
    /// from a bind they already replaced. `duration_secs` is 0 when the
    /// payload is not decodable audio.
    LoadedMetadata { load_id: u64, duration_secs: f32 },
    /// Playback position advanced (or was set)
    TimeUpdate { position_secs: f32 },
    /// Playback actually started
    Play,
    /// Playback actually paused
    Pause,
    /// Playback reached the end of the source
    Ended,
    /// The output hit an error with the current source
    Error { message: String },
}

/// Audio-rendering primitive interface.
///
/// Accepts one bound source at a time and reports its lifecycle over the
/// event stream from `subscribe`. Subscribe before issuing commands to avoid
/// missing events.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Bind a new source. Resets position to 0 and eventually emits
    /// `LoadedMetadata` carrying the returned load token.
    async fn load(&self, handle: MediaHandle) -> AudioResult<u64>;

    /// Request playback. The `Play` event confirms it actually started.
    async fn play(&self) -> AudioResult<()>;

    /// Request pause. The `Pause` event confirms it.
    async fn pause(&self) -> AudioResult<()>;

    /// Set the playback position in seconds (confirmed via `TimeUpdate`)
    fn set_position(&self, seconds: f32);

    /// Set output volume, linear [0, 1]
    fn set_volume(&self, volume: f32);

    /// Set the playback rate multiplier
    fn set_rate(&self, rate: f32);

    /// Subscribe to the playback event stream
    fn subscribe(&self) -> broadcast::Receiver<AudioOutputEvent>;
}
