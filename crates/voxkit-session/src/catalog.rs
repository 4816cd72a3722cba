//! Static registry of abstract voice identities
//!
//! An abstract identity ("rachel") is independent of whatever concrete
//! voices the host engine happens to expose; the resolver maps one onto the
//! other at request time. The catalog is built once at construction and
//! never mutated.

use voxkit_tts::VoiceGender;

/// One abstract voice identity and its descriptive metadata
#[derive(Debug, Clone)]
pub struct VoiceIdentity {
    pub id: String,
    pub display_name: String,
    pub gender: VoiceGender,
    pub accent: String,
    pub description: String,
    /// Concrete-voice name fragments in preference order, most preferred
    /// first, ending in a broad gender label
    pub fragments: Vec<String>,
}

pub struct VoiceCatalog {
    voices: Vec<VoiceIdentity>,
}

fn identity(
    id: &str,
    display_name: &str,
    gender: VoiceGender,
    accent: &str,
    description: &str,
    fragments: &[&str],
) -> VoiceIdentity {
    VoiceIdentity {
        id: id.to_string(),
        display_name: display_name.to_string(),
        gender,
        accent: accent.to_string(),
        description: description.to_string(),
        fragments: fragments.iter().map(|f| f.to_string()).collect(),
    }
}

impl VoiceCatalog {
    /// The built-in identity set. The first entry is the session default.
    pub fn builtin() -> Self {
        let voices = vec![
            identity(
                "rachel",
                "Rachel",
                VoiceGender::Female,
                "American",
                "Calm, clear narration voice",
                &["samantha", "zira", "hazel", "aria", "female"],
            ),
            identity(
                "adam",
                "Adam",
                VoiceGender::Male,
                "American",
                "Deep, authoritative voice",
                &["david", "alex", "daniel", "guy", "male"],
            ),
            identity(
                "bella",
                "Bella",
                VoiceGender::Female,
                "American",
                "Soft, warm voice",
                &["victoria", "susan", "eva", "female"],
            ),
            identity(
                "antoni",
                "Antoni",
                VoiceGender::Male,
                "American",
                "Well-rounded, friendly voice",
                &["mark", "fred", "tom", "male"],
            ),
            identity(
                "elli",
                "Elli",
                VoiceGender::Female,
                "American",
                "Emotive, youthful voice",
                &["karen", "tessa", "moira", "female"],
            ),
            identity(
                "josh",
                "Josh",
                VoiceGender::Male,
                "American",
                "Deep, conversational voice",
                &["james", "george", "ryan", "male"],
            ),
        ];
        Self { voices }
    }

    pub fn get(&self, id: &str) -> Option<&VoiceIdentity> {
        self.voices.iter().find(|v| v.id == id)
    }

    pub fn all(&self) -> &[VoiceIdentity] {
        &self.voices
    }

    pub fn default_voice(&self) -> &VoiceIdentity {
        &self.voices[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_resolves_known_ids() {
        let catalog = VoiceCatalog::builtin();
        assert!(catalog.get("rachel").is_some());
        assert!(catalog.get("josh").is_some());
        assert!(catalog.get("nobody").is_none());
    }

    #[test]
    fn default_voice_is_rachel() {
        let catalog = VoiceCatalog::builtin();
        assert_eq!(catalog.default_voice().id, "rachel");
    }

    #[test]
    fn every_fragment_list_ends_in_a_gender_label() {
        let catalog = VoiceCatalog::builtin();
        for voice in catalog.all() {
            let last = voice.fragments.last().unwrap();
            let expected = match voice.gender {
                VoiceGender::Female => "female",
                VoiceGender::Male => "male",
                other => panic!("unexpected catalog gender {:?}", other),
            };
            assert_eq!(last, expected, "identity {}", voice.id);
        }
    }
}
