//! Generated artifacts

use crate::settings::VoiceSettings;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use voxkit_audio::MediaHandle;

static ARTIFACT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique, monotonically increasing artifact ID
pub fn next_artifact_id() -> u64 {
    ARTIFACT_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Display truncation bound for source text
pub const DISPLAY_TEXT_MAX: usize = 100;

/// One generated, playable result of a synthesis request.
///
/// Immutable after construction. The history store owns the artifact and is
/// the only component allowed to release its media handle.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub id: u64,
    /// Full original text, retained for replay
    pub text: String,
    pub voice_id: String,
    pub handle: MediaHandle,
    /// Measured from the audio where possible, estimated from text length
    /// otherwise; always > 0 for non-empty text
    pub duration_seconds: f32,
    pub created_at: DateTime<Utc>,
    /// Settings at generation time, frozen
    pub settings: VoiceSettings,
}

impl Artifact {
    pub fn new(
        text: String,
        voice_id: String,
        handle: MediaHandle,
        duration_seconds: f32,
        settings: VoiceSettings,
    ) -> Self {
        Self {
            id: next_artifact_id(),
            text,
            voice_id,
            handle,
            duration_seconds,
            created_at: Utc::now(),
            settings,
        }
    }

    /// Source text truncated for display
    pub fn display_text(&self) -> String {
        let mut chars = self.text.chars();
        let head: String = chars.by_ref().take(DISPLAY_TEXT_MAX).collect();
        if chars.next().is_some() {
            format!("{}…", head)
        } else {
            head
        }
    }

    /// Filename suggestion for the download collaborator
    pub fn suggested_filename(&self) -> String {
        format!("voice-{}.{}", self.id, self.handle.format().extension())
    }
}
