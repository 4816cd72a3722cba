//! Timer-driven audio output for hosts without a physical audio path
//!
//! `SimulatedOutput` behaves like a minimal media element: it binds one
//! source at a time, probes WAV metadata for the duration, and advances the
//! playhead on a fixed tick scaled by the playback rate, emitting the same
//! event stream a real output would. Tests and headless sessions drive the
//! playback controller against it.

use crate::error::{AudioError, AudioResult};
use crate::handle::{MediaFormat, MediaHandle};
use crate::output::{AudioOutput, AudioOutputEvent};
use crate::wav::wav_duration_seconds;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

const TICK: Duration = Duration::from_millis(100);
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Default)]
struct OutputState {
    handle: Option<MediaHandle>,
    duration_secs: f32,
    position_secs: f32,
    playing: bool,
    volume: f32,
    rate: f32,
    ticker: Option<JoinHandle<()>>,
    loader: Option<JoinHandle<()>>,
}

pub struct SimulatedOutput {
    state: Arc<Mutex<OutputState>>,
    events_tx: broadcast::Sender<AudioOutputEvent>,
    load_delay: Duration,
    load_seq: AtomicU64,
}

impl SimulatedOutput {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(OutputState {
                volume: 1.0,
                rate: 1.0,
                ..Default::default()
            })),
            events_tx,
            load_delay: Duration::ZERO,
            load_seq: AtomicU64::new(0),
        }
    }

    /// Delay between `load` and the `LoadedMetadata` event, so callers can
    /// observe the loading window.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    pub fn rate(&self) -> f32 {
        self.state.lock().rate
    }
}

impl Default for SimulatedOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioOutput for SimulatedOutput {
    async fn load(&self, handle: MediaHandle) -> AudioResult<u64> {
        let bytes = handle.bytes().ok_or(AudioError::MediaReleased)?;
        let duration_secs = match handle.format() {
            MediaFormat::Wav => wav_duration_seconds(&bytes).unwrap_or(0.0),
            MediaFormat::Json => 0.0,
        };
        let load_id = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            handle_id = handle.id(),
            load_id, duration_secs, "binding media source"
        );

        let mut state = self.state.lock();
        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
        }
        if let Some(loader) = state.loader.take() {
            loader.abort();
        }
        state.handle = Some(handle);
        state.duration_secs = duration_secs;
        state.position_secs = 0.0;
        state.playing = false;

        let tx = self.events_tx.clone();
        let delay = self.load_delay;
        state.loader = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let _ = tx.send(AudioOutputEvent::LoadedMetadata {
                load_id,
                duration_secs,
            });
        }));
        Ok(load_id)
    }

    async fn play(&self) -> AudioResult<()> {
        let mut state = self.state.lock();
        if state.handle.is_none() {
            return Err(AudioError::NoMediaLoaded);
        }
        if state.playing {
            return Ok(());
        }
        // Replay from the start once the previous run reached the end
        if state.duration_secs > 0.0 && state.position_secs >= state.duration_secs {
            state.position_secs = 0.0;
        }
        state.playing = true;
        let _ = self.events_tx.send(AudioOutputEvent::Play);

        let shared = Arc::clone(&self.state);
        let tx = self.events_tx.clone();
        state.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            // The first tick of a tokio interval fires immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let (position_secs, ended) = {
                    let mut s = shared.lock();
                    if !s.playing {
                        break;
                    }
                    s.position_secs += TICK.as_secs_f32() * s.rate;
                    if s.duration_secs > 0.0 && s.position_secs >= s.duration_secs {
                        s.position_secs = s.duration_secs;
                        s.playing = false;
                        (s.position_secs, true)
                    } else {
                        (s.position_secs, false)
                    }
                };
                let _ = tx.send(AudioOutputEvent::TimeUpdate { position_secs });
                if ended {
                    let _ = tx.send(AudioOutputEvent::Ended);
                    break;
                }
            }
        }));
        Ok(())
    }

    async fn pause(&self) -> AudioResult<()> {
        let mut state = self.state.lock();
        if state.handle.is_none() {
            return Err(AudioError::NoMediaLoaded);
        }
        if !state.playing {
            return Ok(());
        }
        state.playing = false;
        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
        }
        let _ = self.events_tx.send(AudioOutputEvent::Pause);
        Ok(())
    }

    fn set_position(&self, seconds: f32) {
        let mut state = self.state.lock();
        if state.handle.is_none() {
            return;
        }
        let max = if state.duration_secs > 0.0 {
            state.duration_secs
        } else {
            f32::MAX
        };
        state.position_secs = seconds.max(0.0).min(max);
        let _ = self.events_tx.send(AudioOutputEvent::TimeUpdate {
            position_secs: state.position_secs,
        });
    }

    fn set_volume(&self, volume: f32) {
        self.state.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn set_rate(&self, rate: f32) {
        if rate.is_finite() && rate > 0.0 {
            self.state.lock().rate = rate;
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AudioOutputEvent> {
        self.events_tx.subscribe()
    }
}

impl Drop for SimulatedOutput {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
        }
        if let Some(loader) = state.loader.take() {
            loader.abort();
        }
    }
}
