//! Deterministic mapping from abstract identities to concrete engine voices
//!
//! Resolution is a pure function: the same identity and the same ordered
//! voice list always produce the same concrete voice, and a non-empty list
//! always produces one.

use crate::catalog::VoiceCatalog;
use crate::error::SessionError;
use voxkit_tts::{ConcreteVoice, VoiceGender};

/// Pick a concrete voice for `voice_id` out of `available`.
///
/// Fallback chain: preferred name fragments, then a gender-label match, then
/// the first available voice. Unknown identities skip straight to the last
/// step. Fails only when `available` is empty.
pub fn resolve<'a>(
    catalog: &VoiceCatalog,
    voice_id: &str,
    available: &'a [ConcreteVoice],
) -> Result<&'a ConcreteVoice, SessionError> {
    if available.is_empty() {
        return Err(SessionError::NoVoicesAvailable);
    }

    if let Some(identity) = catalog.get(voice_id) {
        for fragment in &identity.fragments {
            if let Some(voice) = available.iter().find(|v| name_contains(&v.name, fragment)) {
                return Ok(voice);
            }
        }
        if let Some(voice) = available
            .iter()
            .find(|v| name_matches_gender(&v.name, identity.gender))
        {
            return Ok(voice);
        }
    }

    Ok(&available[0])
}

fn name_contains(name: &str, fragment: &str) -> bool {
    let name = name.to_lowercase();
    let fragment = fragment.to_lowercase();
    // the "male" fragment must not match names like "Female Voice 2"
    if fragment == "male" {
        return name.contains("male") && !name.contains("female");
    }
    name.contains(&fragment)
}

fn name_matches_gender(name: &str, gender: VoiceGender) -> bool {
    let name = name.to_lowercase();
    match gender {
        VoiceGender::Female => name.contains("female") || name.contains("woman"),
        VoiceGender::Male => {
            (name.contains("male") && !name.contains("female"))
                || (name.contains("man") && !name.contains("woman"))
        }
        VoiceGender::Neutral | VoiceGender::Unknown => false,
    }
}
