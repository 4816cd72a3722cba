//! End-to-end generation flow
//!
//! The orchestrator turns a (text, settings) pair into a tracked artifact:
//! validate, resolve a concrete voice, drive the synthesis engine, derive a
//! playable resource, measure or estimate its duration, and append to the
//! history. At most one generation is in flight per session; concurrent
//! calls are rejected, not queued.

use crate::artifact::Artifact;
use crate::catalog::VoiceCatalog;
use crate::error::{SessionError, SessionResult};
use crate::events::SessionEvent;
use crate::history::HistoryStore;
use crate::resolver;
use crate::settings::VoiceSettings;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use voxkit_audio::{AudioOutput, AudioOutputEvent, MediaFormat, MediaHandle};
use voxkit_tts::{SpeechParams, SynthesisEngine, SynthesisEvent};

static GENERATION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_generation_id() -> u64 {
    GENERATION_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Tunables for the generation flow
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Progress heartbeat cadence
    pub progress_interval: Duration,
    /// Heartbeat increment per tick
    pub progress_step: u8,
    /// Heartbeat ceiling until the engine actually completes
    pub progress_ceiling: u8,
    /// Bound on waiting for the audio primitive to report metadata
    pub load_timeout: Duration,
    /// Speaking-rate assumption for the text-length duration estimate
    pub words_per_second: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(200),
            progress_step: 5,
            progress_ceiling: 90,
            load_timeout: Duration::from_secs(3),
            words_per_second: 2.5,
        }
    }
}

pub struct GenerationOrchestrator {
    engine: Arc<dyn SynthesisEngine>,
    output: Arc<dyn AudioOutput>,
    catalog: Arc<VoiceCatalog>,
    history: Arc<HistoryStore>,
    events_tx: broadcast::Sender<SessionEvent>,
    config: GenerationConfig,
    in_flight: AtomicBool,
    cancel_tx: watch::Sender<bool>,
}

impl GenerationOrchestrator {
    pub fn new(
        engine: Arc<dyn SynthesisEngine>,
        output: Arc<dyn AudioOutput>,
        catalog: Arc<VoiceCatalog>,
        history: Arc<HistoryStore>,
        events_tx: broadcast::Sender<SessionEvent>,
        config: GenerationConfig,
    ) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            engine,
            output,
            catalog,
            history,
            events_tx,
            config,
            in_flight: AtomicBool::new(false),
            cancel_tx,
        }
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Request cancellation of the in-flight generation, if any: stop the
    /// heartbeat, abort the engine, release anything half-built.
    pub async fn cancel(&self) {
        if !self.in_flight.load(Ordering::SeqCst) {
            return;
        }
        debug!("cancelling in-flight generation");
        self.cancel_tx.send_replace(true);
        if let Err(e) = self.engine.cancel().await {
            warn!("engine cancel failed: {}", e);
        }
    }

    /// Run one generation. Returns the artifact already appended to history.
    pub async fn generate(&self, text: &str, settings: &VoiceSettings) -> SessionResult<Artifact> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SessionError::GenerationInProgress);
        }
        // cleared on every exit path, including cancellation
        let _guard = FlightGuard {
            flag: &self.in_flight,
        };
        self.cancel_tx.send_replace(false);

        let generation_id = next_generation_id();
        let result = self.run(generation_id, text, settings).await;
        match &result {
            Ok(artifact) => {
                let _ = self.events_tx.send(SessionEvent::GenerationCompleted {
                    generation_id,
                    artifact_id: artifact.id,
                });
            }
            Err(SessionError::Cancelled) => {
                let _ = self
                    .events_tx
                    .send(SessionEvent::GenerationCancelled { generation_id });
            }
            Err(e) => {
                let _ = self.events_tx.send(SessionEvent::GenerationFailed {
                    generation_id,
                    reason: e.to_string(),
                });
            }
        }
        result
    }

    async fn run(
        &self,
        generation_id: u64,
        text: &str,
        settings: &VoiceSettings,
    ) -> SessionResult<Artifact> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        let settings = settings.clamped();

        let _ = self
            .events_tx
            .send(SessionEvent::GenerationStarted { generation_id });
        let heartbeat = Heartbeat::start(generation_id, self.events_tx.clone(), &self.config);

        // Fetched freshly per call: the concrete set can change at runtime
        let voices = self.engine.list_voices().await?;
        if voices.is_empty() {
            return Err(SessionError::NoVoicesAvailable);
        }
        let voice = resolver::resolve(&self.catalog, &settings.voice_id, &voices)?.clone();
        debug!(generation_id, voice = %voice.name, "resolved concrete voice");

        let params = SpeechParams {
            rate: settings.speed,
            pitch: settings.pitch,
            // playback owns volume; synthesis always renders at full scale
            volume: 1.0,
        };

        let mut cancel_rx = self.cancel_tx.subscribe();
        let event = tokio::select! {
            outcome = self.engine.speak(text, &voice, params) => outcome?,
            _ = cancel_rx.wait_for(|cancelled| *cancelled) => {
                debug!(generation_id, "cancelled during synthesis");
                return Err(SessionError::Cancelled);
            }
        };
        // the heartbeat must not outlive the real completion event
        drop(heartbeat);

        let clip = match event {
            SynthesisEvent::Completed { audio, .. } => audio,
            SynthesisEvent::Failed { reason, .. } => {
                return Err(SessionError::SynthesisFailed(reason))
            }
            SynthesisEvent::Cancelled { .. } => return Err(SessionError::Cancelled),
        };
        let _ = self.events_tx.send(SessionEvent::GenerationProgress {
            generation_id,
            percent: 100,
        });

        let handle = match clip {
            Some(clip) => MediaHandle::new(MediaFormat::Wav, clip.data),
            // engine spoke through a device it owns; keep a stand-in payload
            None => {
                let payload = serde_json::json!({
                    "type": "synthesized-speech",
                    "text": text,
                    "voice": voice.name,
                    "engine": self.engine.name(),
                });
                MediaHandle::new(MediaFormat::Json, payload.to_string().into_bytes())
            }
        };

        let duration_seconds = self
            .measure_duration(&handle, text, &mut cancel_rx)
            .await?;

        let artifact = Artifact::new(
            text.to_string(),
            settings.voice_id.clone(),
            handle,
            duration_seconds,
            settings,
        );
        info!(
            generation_id,
            artifact_id = artifact.id,
            duration_seconds,
            "generation complete"
        );
        self.history.append(artifact.clone());
        Ok(artifact)
    }

    /// Load the handle through the audio primitive and wait for metadata,
    /// bounded by the configured timeout; fall back to the text-length
    /// estimate when the primitive cannot report a duration.
    async fn measure_duration(
        &self,
        handle: &MediaHandle,
        text: &str,
        cancel_rx: &mut watch::Receiver<bool>,
    ) -> SessionResult<f32> {
        let mut events = self.output.subscribe();
        let probe_id = match self.output.load(handle.clone()).await {
            Ok(load_id) => load_id,
            Err(e) => {
                warn!("metadata probe could not bind source: {}", e);
                return Ok(self.estimate_duration(text));
            }
        };

        let wait_for_metadata = async {
            loop {
                match events.recv().await {
                    Ok(AudioOutputEvent::LoadedMetadata {
                        load_id,
                        duration_secs,
                    }) if load_id == probe_id => return Some(duration_secs),
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        };

        let measured = tokio::select! {
            probed = tokio::time::timeout(self.config.load_timeout, wait_for_metadata) => {
                match probed {
                    Ok(Some(duration)) if duration > 0.0 => Some(duration),
                    Ok(_) => None,
                    Err(_) => {
                        warn!("{}", SessionError::LoadTimeout);
                        None
                    }
                }
            }
            _ = cancel_rx.wait_for(|cancelled| *cancelled) => {
                // a half-built resource must not outlive a cancelled run
                if let Err(e) = handle.release() {
                    warn!("release after cancel failed: {}", e);
                }
                return Err(SessionError::Cancelled);
            }
        };

        Ok(measured.unwrap_or_else(|| self.estimate_duration(text)))
    }

    fn estimate_duration(&self, text: &str) -> f32 {
        estimate_duration(self.config.words_per_second, text)
    }
}

/// Text-length duration estimate for engines with no capturable audio
fn estimate_duration(words_per_second: f32, text: &str) -> f32 {
    let words = text.split_whitespace().count().max(1);
    words as f32 / words_per_second
}

struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Progress heartbeat task. Indicative only: a fixed cadence climbing toward
/// the ceiling, aborted on drop so no timer outlives the operation.
struct Heartbeat {
    handle: JoinHandle<()>,
}

impl Heartbeat {
    fn start(
        generation_id: u64,
        tx: broadcast::Sender<SessionEvent>,
        config: &GenerationConfig,
    ) -> Self {
        let interval = config.progress_interval;
        let step = config.progress_step;
        let ceiling = config.progress_ceiling;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // a tokio interval fires immediately on the first tick
            ticker.tick().await;
            let mut percent: u8 = 0;
            loop {
                ticker.tick().await;
                percent = percent.saturating_add(step).min(ceiling);
                let _ = tx.send(SessionEvent::GenerationProgress {
                    generation_id,
                    percent,
                });
            }
        });
        Self { handle }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
