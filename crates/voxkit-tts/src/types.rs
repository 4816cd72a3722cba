//! Core types for speech synthesis

use serde::{Deserialize, Serialize};

/// A voice actually exposed by the host synthesis engine at runtime.
///
/// Engines report whatever set they currently have; the set can change
/// between calls on some hosts, so callers should re-list rather than cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteVoice {
    /// Engine-level voice name (also the engine's selection key)
    pub name: String,
    /// Language code if the engine reports one (e.g. "en-US")
    pub language: Option<String>,
    /// Gender if the engine reports one
    pub gender: Option<VoiceGender>,
}

impl ConcreteVoice {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: None,
            gender: None,
        }
    }
}

/// Voice gender categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceGender {
    Male,
    Female,
    Neutral,
    Unknown,
}

/// Prosody parameters for a single synthesis request.
///
/// `rate` and `pitch` are multipliers around 1.0; `volume` is linear [0, 1].
/// Engines map these onto whatever native scale they use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechParams {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// Raw synthesized audio as produced by an engine.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Encoded audio bytes (WAV container for process-backed engines)
    pub data: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
}
