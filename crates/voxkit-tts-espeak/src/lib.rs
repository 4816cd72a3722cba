//! eSpeak synthesis engine implementation for VoxKit

use async_trait::async_trait;
use regex::Regex;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, error, warn};
use voxkit_tts::{
    next_synthesis_id, AudioClip, ConcreteVoice, SpeechParams, SynthError, SynthResult,
    SynthesisEngine, SynthesisEvent, VoiceGender,
};

mod tests;

/// espeak's default speaking rate, scaled by the request's rate multiplier
const BASE_WPM: f32 = 175.0;
/// espeak `--stdout` emits 22050 Hz 16-bit mono WAV
const OUTPUT_SAMPLE_RATE: u32 = 22050;

pub struct EspeakEngine {
    current: tokio::sync::Mutex<Option<Child>>,
    cancelled: AtomicBool,
}

impl EspeakEngine {
    pub fn new() -> Self {
        Self {
            current: tokio::sync::Mutex::new(None),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Resolve the espeak command name (espeak or espeak-ng)
    async fn espeak_command() -> Option<&'static str> {
        for cmd in ["espeak", "espeak-ng"] {
            if Command::new(cmd).arg("--version").output().await.is_ok() {
                return Some(cmd);
            }
        }
        None
    }

    /// Parse `espeak --voices` output.
    ///
    /// Format: Pty Language Age/Gender VoiceName File Other, e.g.
    /// ` 5  en             M  en                 (en 2)`
    fn parse_voice_list(output: &str) -> Vec<ConcreteVoice> {
        let voice_regex = match Regex::new(r"^\s*(\d+)\s+([\w-]+)\s+([MF\+]?)\s+([\w\-_]+)\s+") {
            Ok(re) => re,
            Err(e) => {
                error!("invalid voice list pattern: {}", e);
                return Vec::new();
            }
        };

        let mut voices = Vec::new();
        for line in output.lines().skip(1) {
            if let Some(captures) = voice_regex.captures(line) {
                let language = captures.get(2).map_or("unknown", |m| m.as_str()).to_string();
                let gender = match captures.get(3).map_or("", |m| m.as_str()) {
                    "M" => Some(VoiceGender::Male),
                    "F" => Some(VoiceGender::Female),
                    _ => Some(VoiceGender::Unknown),
                };
                let name = captures.get(4).map_or("unknown", |m| m.as_str()).to_string();

                voices.push(ConcreteVoice {
                    name,
                    language: Some(language),
                    gender,
                });
            }
        }
        voices
    }

    /// Build espeak command arguments for one synthesis request
    fn build_args(text: &str, voice_name: &str, params: SpeechParams) -> Vec<String> {
        let wpm = (BASE_WPM * params.rate).round().clamp(80.0, 450.0) as u32;
        let pitch = (params.pitch * 50.0).round().clamp(0.0, 99.0) as u32;
        let amplitude = (params.volume * 200.0).round().clamp(0.0, 200.0) as u32;

        vec![
            "--stdout".to_string(),
            "-v".to_string(),
            voice_name.to_string(),
            "-s".to_string(),
            wpm.to_string(),
            "-p".to_string(),
            pitch.to_string(),
            "-a".to_string(),
            amplitude.to_string(),
            text.to_string(),
        ]
    }
}

impl Default for EspeakEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SynthesisEngine for EspeakEngine {
    fn name(&self) -> &str {
        "eSpeak"
    }

    async fn is_available(&self) -> bool {
        Self::espeak_command().await.is_some()
    }

    async fn list_voices(&self) -> SynthResult<Vec<ConcreteVoice>> {
        let cmd = Self::espeak_command()
            .await
            .ok_or_else(|| SynthError::EngineNotAvailable("espeak not found".to_string()))?;

        let output = Command::new(cmd).arg("--voices").output().await?;
        let listing = String::from_utf8_lossy(&output.stdout);
        let voices = Self::parse_voice_list(&listing);
        debug!("loaded {} espeak voices", voices.len());
        Ok(voices)
    }

    async fn speak(
        &self,
        text: &str,
        voice: &ConcreteVoice,
        params: SpeechParams,
    ) -> SynthResult<SynthesisEvent> {
        if text.trim().is_empty() {
            return Err(SynthError::InvalidInput("empty text".to_string()));
        }

        let synthesis_id = next_synthesis_id();
        let cmd = Self::espeak_command()
            .await
            .ok_or_else(|| SynthError::EngineNotAvailable("espeak not found".to_string()))?;
        let args = Self::build_args(text, &voice.name, params);
        debug!(synthesis_id, "running espeak synthesis: {} {:?}", cmd, args);

        self.cancelled.store(false, Ordering::SeqCst);
        let mut child = Command::new(cmd)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| SynthError::SynthesisError("no stdout pipe".to_string()))?;
        let stderr = child.stderr.take();
        *self.current.lock().await = Some(child);

        // espeak writes the whole WAV then exits; EOF marks completion
        let mut data = Vec::new();
        let read_result = stdout.read_to_end(&mut data).await;

        let status = match self.current.lock().await.take() {
            Some(mut child) => child.wait().await?,
            None => return Ok(SynthesisEvent::Cancelled { synthesis_id }),
        };
        if self.cancelled.swap(false, Ordering::SeqCst) {
            return Ok(SynthesisEvent::Cancelled { synthesis_id });
        }
        read_result?;

        if !status.success() {
            let mut err_buf = Vec::new();
            if let Some(mut pipe) = stderr {
                let _ = pipe.read_to_end(&mut err_buf).await;
            }
            let reason = String::from_utf8_lossy(&err_buf).trim().to_string();
            error!(synthesis_id, "espeak synthesis failed: {}", reason);
            return Ok(SynthesisEvent::Failed {
                synthesis_id,
                reason: format!("espeak error: {}", reason),
            });
        }
        if data.is_empty() {
            warn!(synthesis_id, "espeak produced no audio data");
            return Ok(SynthesisEvent::Failed {
                synthesis_id,
                reason: "no audio data generated".to_string(),
            });
        }

        Ok(SynthesisEvent::Completed {
            synthesis_id,
            audio: Some(AudioClip {
                data,
                sample_rate: OUTPUT_SAMPLE_RATE,
                channels: 1,
            }),
        })
    }

    async fn cancel(&self) -> SynthResult<()> {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(child) = self.current.lock().await.as_mut() {
            debug!("killing in-flight espeak process");
            child.start_kill()?;
        }
        Ok(())
    }
}
