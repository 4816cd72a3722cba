//! Session wiring
//!
//! One session binds one synthesis engine and one audio output to a fresh
//! catalog, history, orchestrator, and playback controller. Both
//! capabilities are injected at construction, so independent sessions can
//! coexist and tests can substitute doubles emitting synthetic events.

use crate::artifact::Artifact;
use crate::catalog::VoiceCatalog;
use crate::error::SessionResult;
use crate::events::SessionEvent;
use crate::generation::{GenerationConfig, GenerationOrchestrator};
use crate::history::{HistoryStore, DEFAULT_HISTORY_CAPACITY};
use crate::playback::PlaybackController;
use crate::settings::VoiceSettings;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;
use voxkit_audio::{AudioOutput, MediaHandle};
use voxkit_tts::SynthesisEngine;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub history_capacity: usize,
    pub generation: GenerationConfig,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            generation: GenerationConfig::default(),
        }
    }
}

/// What the download collaborator needs to trigger a file save: the resource
/// handle and a suggested filename. The save mechanism itself lives outside
/// the core.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub handle: MediaHandle,
    pub filename: String,
}

pub struct Session {
    catalog: Arc<VoiceCatalog>,
    history: Arc<HistoryStore>,
    orchestrator: GenerationOrchestrator,
    playback: PlaybackController,
    events_tx: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Wire a session around the two injected capabilities. Must be called
    /// within a tokio runtime.
    pub fn start(
        engine: Arc<dyn SynthesisEngine>,
        output: Arc<dyn AudioOutput>,
        opts: SessionOptions,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let catalog = Arc::new(VoiceCatalog::builtin());
        let history = Arc::new(HistoryStore::with_capacity(opts.history_capacity));
        let orchestrator = GenerationOrchestrator::new(
            engine,
            Arc::clone(&output),
            Arc::clone(&catalog),
            Arc::clone(&history),
            events_tx.clone(),
            opts.generation,
        );
        let playback = PlaybackController::new(output, Arc::clone(&history));
        info!("voice session started");
        Self {
            catalog,
            history,
            orchestrator,
            playback,
            events_tx,
        }
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    /// Subscribe to generation lifecycle events
    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    pub fn is_generating(&self) -> bool {
        self.orchestrator.is_generating()
    }

    /// Generate an artifact and append it to the history
    pub async fn generate(
        &self,
        text: &str,
        settings: &VoiceSettings,
    ) -> SessionResult<Artifact> {
        self.orchestrator.generate(text, settings).await
    }

    /// The full flow: generate, append, then select the new artifact for
    /// playback. The artifact is selectable only after the append completed.
    pub async fn generate_and_select(
        &self,
        text: &str,
        settings: &VoiceSettings,
    ) -> SessionResult<Artifact> {
        let artifact = self.orchestrator.generate(text, settings).await?;
        self.playback.select(artifact.id).await?;
        Ok(artifact)
    }

    /// Cancel the in-flight generation, if any
    pub async fn cancel_generation(&self) {
        self.orchestrator.cancel().await;
    }

    /// Download surface for a history artifact; `None` once it is gone or
    /// its resource was released
    pub fn download_request(&self, artifact_id: u64) -> Option<DownloadRequest> {
        let artifact = self.history.get(artifact_id)?;
        if artifact.handle.is_released() {
            return None;
        }
        Some(DownloadRequest {
            filename: artifact.suggested_filename(),
            handle: artifact.handle.clone(),
        })
    }

    /// Tear the session down: cancel any in-flight generation and release
    /// every artifact resource.
    pub async fn shutdown(self) {
        info!("shutting down voice session");
        self.orchestrator.cancel().await;
        self.history.clear();
    }
}
