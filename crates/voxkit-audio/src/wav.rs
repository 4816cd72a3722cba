//! WAV metadata probing

use std::io::Cursor;

/// Read the playable duration of a WAV payload from its header.
///
/// Returns `None` when the bytes are not a readable WAV stream; callers fall
/// back to their own duration estimate.
pub fn wav_duration_seconds(bytes: &[u8]) -> Option<f32> {
    let reader = hound::WavReader::new(Cursor::new(bytes)).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(reader.duration() as f32 / spec.sample_rate as f32)
}
