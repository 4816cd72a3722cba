//! Playback state machine mirroring the audio primitive
//!
//! The controller issues commands to the audio output and mirrors its event
//! stream into one observable `PlaybackState`. Primitive events are the only
//! writers of status and position; nothing here sets "playing"
//! optimistically, so the mirror stays correct even when a play request is
//! denied by the host.

use crate::error::{SessionError, SessionResult};
use crate::history::HistoryStore;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use voxkit_audio::{AudioOutput, AudioOutputEvent};

pub const VOLUME_RANGE: (f32, f32) = (0.0, 1.0);
pub const RATE_RANGE: (f32, f32) = (0.25, 4.0);

/// Where the controller is in the select → load → play cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Idle,
    Loading,
    Ready,
    Playing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Weak reference: the id does not extend the artifact's lifetime
    pub selected_artifact: Option<u64>,
    pub status: PlaybackStatus,
    pub position_seconds: f32,
    pub duration_seconds: f32,
    pub volume: f32,
    pub rate: f32,
    /// Token of the load call backing the current selection; loaded-metadata
    /// events carrying any other token are stale and ignored
    current_load: Option<u64>,
}

impl PlaybackState {
    fn idle() -> Self {
        Self {
            selected_artifact: None,
            status: PlaybackStatus::Idle,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            volume: 1.0,
            rate: 1.0,
            current_load: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn is_loading(&self) -> bool {
        self.status == PlaybackStatus::Loading
    }
}

pub struct PlaybackController {
    output: Arc<dyn AudioOutput>,
    history: Arc<HistoryStore>,
    state: Arc<RwLock<PlaybackState>>,
    state_tx: Sender<PlaybackState>,
    state_rx: Receiver<PlaybackState>,
    pump: JoinHandle<()>,
}

impl PlaybackController {
    pub fn new(output: Arc<dyn AudioOutput>, history: Arc<HistoryStore>) -> Self {
        let state = Arc::new(RwLock::new(PlaybackState::idle()));
        let (state_tx, state_rx) = crossbeam_channel::unbounded();

        let mut events = output.subscribe();
        let pump_state = Arc::clone(&state);
        let pump_tx = state_tx.clone();
        let pump = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => apply_event(&pump_state, &pump_tx, event),
                    Err(RecvError::Lagged(n)) => {
                        warn!("playback event stream lagged by {}", n);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self {
            output,
            history,
            state,
            state_tx,
            state_rx,
            pump,
        }
    }

    /// Bind the artifact's resource to the output and enter `Loading`.
    /// The primitive's loaded event moves the state to `Ready`.
    pub async fn select(&self, artifact_id: u64) -> SessionResult<()> {
        let artifact = self
            .history
            .get(artifact_id)
            .ok_or(SessionError::ArtifactNotFound(artifact_id))?;

        {
            let mut s = self.state.write();
            s.selected_artifact = Some(artifact.id);
            s.current_load = None;
            s.status = PlaybackStatus::Loading;
            s.position_seconds = 0.0;
            s.duration_seconds = artifact.duration_seconds;
            let snapshot = s.clone();
            drop(s);
            let _ = self.state_tx.send(snapshot);
        }
        debug!(artifact_id, "selected artifact for playback");

        match self.output.load(artifact.handle.clone()).await {
            Ok(load_id) => {
                self.state.write().current_load = Some(load_id);
                Ok(())
            }
            Err(e) => {
                let mut s = self.state.write();
                s.selected_artifact = None;
                s.current_load = None;
                s.status = PlaybackStatus::Idle;
                let snapshot = s.clone();
                drop(s);
                let _ = self.state_tx.send(snapshot);
                Err(e.into())
            }
        }
    }

    /// Request play or pause on the primitive. No-op while idle or loading;
    /// the mirrored events flip `is_playing`, not this call.
    pub async fn toggle_play_pause(&self) -> SessionResult<()> {
        let status = self.state.read().status;
        match status {
            PlaybackStatus::Idle | PlaybackStatus::Loading => Ok(()),
            PlaybackStatus::Ready => {
                self.output.play().await?;
                Ok(())
            }
            PlaybackStatus::Playing => {
                self.output.pause().await?;
                Ok(())
            }
        }
    }

    /// Set the playhead, clamped into [0, duration]. Ignored while idle or
    /// loading.
    pub fn seek(&self, seconds: f32) {
        if !seconds.is_finite() {
            return;
        }
        let (status, duration) = {
            let s = self.state.read();
            (s.status, s.duration_seconds)
        };
        if matches!(status, PlaybackStatus::Idle | PlaybackStatus::Loading) {
            return;
        }
        self.output.set_position(seconds.clamp(0.0, duration.max(0.0)));
    }

    /// Pause and reset the playhead to the start
    pub async fn stop(&self) -> SessionResult<()> {
        let status = self.state.read().status;
        if matches!(status, PlaybackStatus::Idle | PlaybackStatus::Loading) {
            return Ok(());
        }
        if status == PlaybackStatus::Playing {
            self.output.pause().await?;
        }
        self.output.set_position(0.0);
        Ok(())
    }

    /// Allowed in any state; pushed to the primitive immediately
    pub fn set_volume(&self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        let volume = volume.clamp(VOLUME_RANGE.0, VOLUME_RANGE.1);
        self.output.set_volume(volume);
        let mut s = self.state.write();
        s.volume = volume;
        let snapshot = s.clone();
        drop(s);
        let _ = self.state_tx.send(snapshot);
    }

    /// Allowed in any state; pushed to the primitive immediately
    pub fn set_playback_rate(&self, rate: f32) {
        if !rate.is_finite() {
            return;
        }
        let rate = rate.clamp(RATE_RANGE.0, RATE_RANGE.1);
        self.output.set_rate(rate);
        let mut s = self.state.write();
        s.rate = rate;
        let snapshot = s.clone();
        drop(s);
        let _ = self.state_tx.send(snapshot);
    }

    pub fn state(&self) -> PlaybackState {
        self.state.read().clone()
    }

    /// Observe state snapshots as they change
    pub fn subscribe(&self) -> Receiver<PlaybackState> {
        self.state_rx.clone()
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Mirror one primitive event into the state. Sole writer of status and
/// position; snapshots are broadcast only on status transitions to keep the
/// observer feed quiet during time updates.
fn apply_event(
    state: &Arc<RwLock<PlaybackState>>,
    tx: &Sender<PlaybackState>,
    event: AudioOutputEvent,
) {
    let mut s = state.write();
    let previous_status = s.status;
    match event {
        AudioOutputEvent::LoadedMetadata {
            load_id,
            duration_secs,
        } => {
            if s.status == PlaybackStatus::Loading && s.current_load == Some(load_id) {
                s.status = PlaybackStatus::Ready;
                if duration_secs > 0.0 {
                    s.duration_seconds = duration_secs;
                }
            }
        }
        AudioOutputEvent::TimeUpdate { position_secs } => {
            if s.selected_artifact.is_some() {
                s.position_seconds = position_secs;
            }
        }
        AudioOutputEvent::Play => {
            if matches!(s.status, PlaybackStatus::Ready | PlaybackStatus::Playing) {
                s.status = PlaybackStatus::Playing;
            }
        }
        AudioOutputEvent::Pause | AudioOutputEvent::Ended => {
            if s.status == PlaybackStatus::Playing {
                s.status = PlaybackStatus::Ready;
            }
        }
        AudioOutputEvent::Error { message } => {
            warn!("audio output error: {}", message);
            if s.status == PlaybackStatus::Loading {
                s.status = PlaybackStatus::Ready;
            }
        }
    }
    if s.status != previous_status {
        let snapshot = s.clone();
        drop(s);
        let _ = tx.send(snapshot);
    }
}
