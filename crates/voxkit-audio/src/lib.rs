//! Audio-rendering primitive abstraction for VoxKit
//!
//! This crate defines the playback-side capability the session core drives:
//! an `AudioOutput` that accepts a media resource handle and reports its
//! lifecycle (metadata loaded, time updates, play/pause, ended) as events.
//! It also owns the `MediaHandle` resource type, whose underlying bytes must
//! be explicitly released, and a timer-driven `SimulatedOutput` for hosts
//! without a physical audio path.

pub mod error;
pub mod handle;
pub mod output;
pub mod sim;
pub mod wav;

pub use error::{AudioError, AudioResult};
pub use handle::{MediaFormat, MediaHandle};
pub use output::{AudioOutput, AudioOutputEvent};
pub use sim::SimulatedOutput;
pub use wav::wav_duration_seconds;
