//! Tests for the eSpeak engine

#[cfg(test)]
mod tests {
    use crate::EspeakEngine;
    use voxkit_tts::{SpeechParams, SynthesisEngine, VoiceGender};

    #[tokio::test]
    async fn engine_reports_its_name() {
        let engine = EspeakEngine::new();
        assert_eq!(engine.name(), "eSpeak");
    }

    #[tokio::test]
    async fn availability_check_does_not_panic() {
        let engine = EspeakEngine::new();
        // The test environment may or may not have espeak installed
        let _ = engine.is_available().await;
    }

    #[test]
    fn build_args_maps_prosody_to_espeak_scales() {
        let params = SpeechParams {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        };
        let args = EspeakEngine::build_args("hello", "en-us", params);
        assert_eq!(
            args,
            vec![
                "--stdout", "-v", "en-us", "-s", "175", "-p", "50", "-a", "200", "hello"
            ]
        );
    }

    #[test]
    fn build_args_clamps_extremes() {
        let params = SpeechParams {
            rate: 10.0,
            pitch: 10.0,
            volume: 10.0,
        };
        let args = EspeakEngine::build_args("x", "en", params);
        let value_after = |flag: &str| {
            let i = args.iter().position(|a| a == flag).unwrap();
            args[i + 1].clone()
        };
        assert_eq!(value_after("-s"), "450");
        assert_eq!(value_after("-p"), "99");
        assert_eq!(value_after("-a"), "200");
    }

    #[test]
    fn build_args_scales_rate_multiplier() {
        let params = SpeechParams {
            rate: 2.0,
            pitch: 0.5,
            volume: 0.5,
        };
        let args = EspeakEngine::build_args("x", "en", params);
        assert!(args.contains(&"350".to_string())); // 175 * 2.0
        assert!(args.contains(&"25".to_string())); // 0.5 * 50
        assert!(args.contains(&"100".to_string())); // 0.5 * 200
    }

    #[test]
    fn parses_espeak_voice_listing() {
        let listing = "\
Pty Language Age/Gender VoiceName          File          Other Languages
 5  af             M  afrikaans          other/af
 5  en             M  default            default
 2  en-gb          F  english            en            (en 2)
";
        let voices = EspeakEngine::parse_voice_list(listing);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[0].name, "afrikaans");
        assert_eq!(voices[0].language.as_deref(), Some("af"));
        assert_eq!(voices[0].gender, Some(VoiceGender::Male));
        assert_eq!(voices[2].name, "english");
        assert_eq!(voices[2].gender, Some(VoiceGender::Female));
    }

    #[test]
    fn parses_empty_listing_to_no_voices() {
        let voices = EspeakEngine::parse_voice_list("Pty Language Age/Gender VoiceName\n");
        assert!(voices.is_empty());
    }
}
