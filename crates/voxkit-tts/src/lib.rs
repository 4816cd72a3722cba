//! Speech-synthesis abstraction layer for VoxKit
//!
//! This crate provides the foundational types and traits for driving a
//! speech-synthesis capability: the engine trait, terminal synthesis events,
//! concrete-voice metadata, and per-request prosody parameters.

use std::sync::atomic::{AtomicU64, Ordering};

pub mod engine;
pub mod error;
pub mod types;

pub use engine::{SynthesisEngine, SynthesisEvent};
pub use error::{SynthError, SynthResult};
pub use types::{AudioClip, ConcreteVoice, SpeechParams, VoiceGender};

/// Generates unique synthesis IDs
static SYNTHESIS_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique synthesis ID
pub fn next_synthesis_id() -> u64 {
    SYNTHESIS_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}
