//! Per-request voice settings

use serde::{Deserialize, Serialize};

pub const SPEED_RANGE: (f32, f32) = (0.5, 2.0);
pub const PITCH_RANGE: (f32, f32) = (0.5, 1.5);
pub const UNIT_RANGE: (f32, f32) = (0.0, 1.0);

const DEFAULT_SPEED: f32 = 1.0;
const DEFAULT_PITCH: f32 = 1.0;
const DEFAULT_STABILITY: f32 = 0.75;
const DEFAULT_CLARITY: f32 = 0.75;

/// Voice identity plus prosody parameters for one generation request.
///
/// A value type: callers own it, each request copies it, and the copy stored
/// on an artifact never changes afterwards. Numeric fields are clamped into
/// their ranges before use regardless of what the caller supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub voice_id: String,
    pub speed: f32,
    pub pitch: f32,
    pub stability: f32,
    pub clarity: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice_id: "rachel".to_string(),
            speed: DEFAULT_SPEED,
            pitch: DEFAULT_PITCH,
            stability: DEFAULT_STABILITY,
            clarity: DEFAULT_CLARITY,
        }
    }
}

impl VoiceSettings {
    /// Copy with every numeric field forced into range
    pub fn clamped(&self) -> Self {
        Self {
            voice_id: self.voice_id.clone(),
            speed: clamp_or(self.speed, SPEED_RANGE, DEFAULT_SPEED),
            pitch: clamp_or(self.pitch, PITCH_RANGE, DEFAULT_PITCH),
            stability: clamp_or(self.stability, UNIT_RANGE, DEFAULT_STABILITY),
            clarity: clamp_or(self.clarity, UNIT_RANGE, DEFAULT_CLARITY),
        }
    }
}

// f32::clamp propagates NaN; non-finite input falls back to the field default
fn clamp_or(value: f32, (lo, hi): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_in_range() {
        let settings = VoiceSettings::default();
        assert_eq!(settings.voice_id, "rachel");
        assert_eq!(settings.speed, 1.0);
        assert_eq!(settings.pitch, 1.0);
        assert_eq!(settings.stability, 0.75);
        assert_eq!(settings.clarity, 0.75);
        assert_eq!(settings.clamped(), settings);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let settings = VoiceSettings {
            voice_id: "adam".to_string(),
            speed: 5.0,
            pitch: -1.0,
            stability: 2.0,
            clarity: -0.5,
        };
        let clamped = settings.clamped();
        assert_eq!(clamped.speed, 2.0);
        assert_eq!(clamped.pitch, 0.5);
        assert_eq!(clamped.stability, 1.0);
        assert_eq!(clamped.clarity, 0.0);
        assert_eq!(clamped.voice_id, "adam");
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        let settings = VoiceSettings {
            voice_id: "rachel".to_string(),
            speed: f32::NAN,
            pitch: f32::INFINITY,
            stability: f32::NEG_INFINITY,
            clarity: f32::NAN,
        };
        let clamped = settings.clamped();
        assert_eq!(clamped.speed, 1.0);
        // infinity is non-finite: default, not range edge
        assert_eq!(clamped.pitch, 1.0);
        assert_eq!(clamped.stability, 0.75);
        assert_eq!(clamped.clarity, 0.75);
    }

    #[test]
    fn in_range_values_are_untouched() {
        let settings = VoiceSettings {
            voice_id: "elli".to_string(),
            speed: 1.5,
            pitch: 0.8,
            stability: 0.2,
            clarity: 0.9,
        };
        assert_eq!(settings.clamped(), settings);
    }
}
