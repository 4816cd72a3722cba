//! Session integration tests
//!
//! These drive the full core (orchestrator, history, playback) against a
//! stub engine emitting synthetic events and the simulated audio output.
//! Timer-dependent paths run under paused time for determinism.

use async_trait::async_trait;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use voxkit_audio::{MediaFormat, SimulatedOutput};
use voxkit_session::{
    PlaybackStatus, Session, SessionError, SessionEvent, SessionOptions, VoiceSettings,
};
use voxkit_tts::{
    next_synthesis_id, AudioClip, ConcreteVoice, SpeechParams, SynthResult, SynthesisEngine,
    SynthesisEvent,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

fn wav_bytes(seconds: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buf, spec).unwrap();
        for _ in 0..((8000.0 * seconds) as usize) {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    buf.into_inner()
}

/// Engine behavior for the next speak call
#[derive(Clone, Copy)]
enum StubBehavior {
    /// Resolve with a WAV clip of the given length
    Wav(f32),
    /// Resolve with no capturable audio
    Silent,
    /// Resolve as failed with an engine-reported reason
    Fail,
    /// Sleep before resolving silent
    Slow(Duration),
    /// Suspend until cancelled
    Hang,
}

struct StubEngine {
    voices: Vec<ConcreteVoice>,
    behavior: parking_lot::Mutex<StubBehavior>,
    cancel_signal: Notify,
    cancel_count: AtomicUsize,
    speak_count: AtomicUsize,
}

impl StubEngine {
    fn new(voices: Vec<ConcreteVoice>, behavior: StubBehavior) -> Arc<Self> {
        Arc::new(Self {
            voices,
            behavior: parking_lot::Mutex::new(behavior),
            cancel_signal: Notify::new(),
            cancel_count: AtomicUsize::new(0),
            speak_count: AtomicUsize::new(0),
        })
    }

    fn set_behavior(&self, behavior: StubBehavior) {
        *self.behavior.lock() = behavior;
    }

    fn speak_calls(&self) -> usize {
        self.speak_count.load(Ordering::SeqCst)
    }

    fn cancel_calls(&self) -> usize {
        self.cancel_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesisEngine for StubEngine {
    fn name(&self) -> &str {
        "stub"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn list_voices(&self) -> SynthResult<Vec<ConcreteVoice>> {
        Ok(self.voices.clone())
    }

    async fn speak(
        &self,
        _text: &str,
        _voice: &ConcreteVoice,
        _params: SpeechParams,
    ) -> SynthResult<SynthesisEvent> {
        self.speak_count.fetch_add(1, Ordering::SeqCst);
        let behavior = *self.behavior.lock();
        let synthesis_id = next_synthesis_id();
        match behavior {
            StubBehavior::Wav(seconds) => Ok(SynthesisEvent::Completed {
                synthesis_id,
                audio: Some(AudioClip {
                    data: wav_bytes(seconds),
                    sample_rate: 8000,
                    channels: 1,
                }),
            }),
            StubBehavior::Silent => Ok(SynthesisEvent::Completed {
                synthesis_id,
                audio: None,
            }),
            StubBehavior::Fail => Ok(SynthesisEvent::Failed {
                synthesis_id,
                reason: "engine exploded".to_string(),
            }),
            StubBehavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(SynthesisEvent::Completed {
                    synthesis_id,
                    audio: None,
                })
            }
            StubBehavior::Hang => {
                self.cancel_signal.notified().await;
                Ok(SynthesisEvent::Cancelled { synthesis_id })
            }
        }
    }

    async fn cancel(&self) -> SynthResult<()> {
        self.cancel_count.fetch_add(1, Ordering::SeqCst);
        self.cancel_signal.notify_one();
        Ok(())
    }
}

fn default_voices() -> Vec<ConcreteVoice> {
    vec![
        ConcreteVoice::named("Samantha"),
        ConcreteVoice::named("Alex"),
    ]
}

fn stub_session(behavior: StubBehavior) -> (Arc<Session>, Arc<StubEngine>) {
    stub_session_with_output(behavior, SimulatedOutput::new())
}

fn stub_session_with_output(
    behavior: StubBehavior,
    output: SimulatedOutput,
) -> (Arc<Session>, Arc<StubEngine>) {
    let engine = StubEngine::new(default_voices(), behavior);
    let dyn_engine: Arc<dyn SynthesisEngine> = engine.clone();
    let session = Arc::new(Session::start(
        dyn_engine,
        Arc::new(output),
        SessionOptions::default(),
    ));
    (session, engine)
}

/// Poll the playback state until `predicate` holds, or fail after 100 polls
async fn wait_for_playback<F>(session: &Session, predicate: F)
where
    F: Fn(&voxkit_session::PlaybackState) -> bool,
{
    for _ in 0..100 {
        if predicate(&session.playback().state()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!(
        "playback never reached expected state: {:?}",
        session.playback().state()
    );
}

#[tokio::test(start_paused = true)]
async fn generate_with_defaults_yields_tracked_artifact() {
    init_tracing();
    let (session, _engine) = stub_session(StubBehavior::Wav(1.0));

    let artifact = session
        .generate("Hello world", &VoiceSettings::default())
        .await
        .unwrap();

    assert_eq!(artifact.text, "Hello world");
    assert_eq!(artifact.voice_id, "rachel");
    assert!((artifact.duration_seconds - 1.0).abs() < 1e-3);

    let listed = session.history().list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, artifact.id);
}

#[tokio::test(start_paused = true)]
async fn empty_input_fails_before_any_engine_call() {
    let (session, engine) = stub_session(StubBehavior::Wav(1.0));

    let result = session.generate("   \n\t ", &VoiceSettings::default()).await;
    assert!(matches!(result, Err(SessionError::EmptyInput)));
    assert!(session.history().is_empty());
    assert_eq!(engine.speak_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn silent_engine_estimates_duration_from_text_length() {
    let (session, _engine) = stub_session(StubBehavior::Silent);

    // five words at the default 2.5 words/second
    let artifact = session
        .generate("one two three four five", &VoiceSettings::default())
        .await
        .unwrap();

    assert!((artifact.duration_seconds - 2.0).abs() < 1e-3);
    assert_eq!(artifact.handle.format(), MediaFormat::Json);
    assert!(artifact.suggested_filename().ends_with(".json"));
}

#[tokio::test(start_paused = true)]
async fn out_of_range_settings_are_clamped_into_the_snapshot() {
    let (session, _engine) = stub_session(StubBehavior::Silent);

    let settings = VoiceSettings {
        speed: 5.0,
        pitch: -3.0,
        ..VoiceSettings::default()
    };
    let artifact = session.generate("clamp me", &settings).await.unwrap();
    assert_eq!(artifact.settings.speed, 2.0);
    assert_eq!(artifact.settings.pitch, 0.5);
}

#[tokio::test(start_paused = true)]
async fn failed_synthesis_leaves_prior_history_untouched() {
    let (session, engine) = stub_session(StubBehavior::Silent);
    let kept = session
        .generate("keep me", &VoiceSettings::default())
        .await
        .unwrap();

    let mut events = session.events();
    engine.set_behavior(StubBehavior::Fail);
    let result = session.generate("doomed", &VoiceSettings::default()).await;

    match result {
        Err(SessionError::SynthesisFailed(reason)) => assert!(reason.contains("engine exploded")),
        other => panic!("expected SynthesisFailed, got {:?}", other.map(|a| a.id)),
    }
    let listed = session.history().list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, kept.id);
    assert!(!listed[0].handle.is_released());

    // the observer is told, so it can reset its transient indicators
    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, SessionEvent::GenerationFailed { .. }) {
            saw_failure = true;
        }
    }
    assert!(saw_failure);
}

#[tokio::test(start_paused = true)]
async fn engine_without_voices_fails_generation() {
    let engine = StubEngine::new(Vec::new(), StubBehavior::Silent);
    let dyn_engine: Arc<dyn SynthesisEngine> = engine.clone();
    let session = Session::start(
        dyn_engine,
        Arc::new(SimulatedOutput::new()),
        SessionOptions::default(),
    );

    let result = session.generate("anything", &VoiceSettings::default()).await;
    assert!(matches!(result, Err(SessionError::NoVoicesAvailable)));
    assert!(session.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn concurrent_generation_is_rejected_not_queued() {
    let (session, _engine) = stub_session(StubBehavior::Slow(Duration::from_secs(2)));

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            session
                .generate("first request", &VoiceSettings::default())
                .await
        })
    };
    // let the first call reach its suspension point
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    assert!(session.is_generating());

    let second = session
        .generate("second request", &VoiceSettings::default())
        .await;
    assert!(matches!(second, Err(SessionError::GenerationInProgress)));

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.text, "first request");

    // the guard is clear again once the first completed
    let third = session
        .generate("third request", &VoiceSettings::default())
        .await
        .unwrap();
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history().list()[0].id, third.id);
}

#[tokio::test(start_paused = true)]
async fn eleventh_generation_evicts_the_first() {
    let (session, _engine) = stub_session(StubBehavior::Silent);

    let first = session
        .generate("generation 0", &VoiceSettings::default())
        .await
        .unwrap();
    let first_handle = first.handle.clone();

    for i in 1..11 {
        session
            .generate(&format!("generation {}", i), &VoiceSettings::default())
            .await
            .unwrap();
    }

    let listed = session.history().list();
    assert_eq!(listed.len(), 10);
    assert!(session.history().get(first.id).is_none());
    assert!(first_handle.is_released());
    // most-recent-first, and every survivor still holds its resource
    for pair in listed.windows(2) {
        assert!(pair[0].id > pair[1].id);
    }
    assert!(listed.iter().all(|a| !a.handle.is_released()));
}

#[tokio::test(start_paused = true)]
async fn cancel_clears_the_guard_and_produces_no_artifact() {
    let (session, engine) = stub_session(StubBehavior::Hang);

    let pending = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.generate("hanging", &VoiceSettings::default()).await })
    };
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    assert!(session.is_generating());

    session.cancel_generation().await;
    let result = pending.await.unwrap();
    assert!(matches!(result, Err(SessionError::Cancelled)));
    assert!(session.history().is_empty());
    assert!(!session.is_generating());
    assert_eq!(engine.cancel_calls(), 1);

    // a fresh generation goes through after the cancelled one
    engine.set_behavior(StubBehavior::Silent);
    session
        .generate("after cancel", &VoiceSettings::default())
        .await
        .unwrap();
    assert_eq!(session.history().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn progress_heartbeat_is_capped_until_completion() {
    let (session, _engine) = stub_session(StubBehavior::Slow(Duration::from_secs(10)));
    let mut events = session.events();

    session
        .generate("slow one", &VoiceSettings::default())
        .await
        .unwrap();

    let mut progress = Vec::new();
    let mut completed_after_final_progress = false;
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::GenerationProgress { percent, .. } => progress.push(percent),
            SessionEvent::GenerationCompleted { .. } => {
                completed_after_final_progress = progress.last() == Some(&100)
            }
            _ => {}
        }
    }

    assert!(!progress.is_empty());
    // monotonically non-decreasing, capped at 90 until the jump to 100
    for pair in progress.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
    let (final_jump, heartbeat) = progress.split_last().unwrap();
    assert_eq!(*final_jump, 100);
    assert!(heartbeat.iter().all(|p| *p <= 90));
    // the heartbeat ran long enough to hit the ceiling
    assert_eq!(heartbeat.last(), Some(&90));
    assert!(completed_after_final_progress);
}

#[tokio::test(start_paused = true)]
async fn toggle_while_loading_is_a_noop() {
    let output = SimulatedOutput::new().with_load_delay(Duration::from_millis(500));
    let (session, _engine) = stub_session_with_output(StubBehavior::Wav(10.0), output);

    let artifact = session
        .generate_and_select("a longer narration", &VoiceSettings::default())
        .await
        .unwrap();

    let state = session.playback().state();
    assert_eq!(state.selected_artifact, Some(artifact.id));
    assert_eq!(state.status, PlaybackStatus::Loading);

    // no-op: no error, still not playing
    session.playback().toggle_play_pause().await.unwrap();
    let state = session.playback().state();
    assert_eq!(state.status, PlaybackStatus::Loading);
    assert!(!state.is_playing());

    wait_for_playback(&session, |s| s.status == PlaybackStatus::Ready).await;
}

#[tokio::test(start_paused = true)]
async fn playing_state_mirrors_primitive_events() {
    let (session, _engine) = stub_session(StubBehavior::Wav(10.0));

    session
        .generate_and_select("mirror test", &VoiceSettings::default())
        .await
        .unwrap();
    wait_for_playback(&session, |s| s.status == PlaybackStatus::Ready).await;

    session.playback().toggle_play_pause().await.unwrap();
    wait_for_playback(&session, |s| s.status == PlaybackStatus::Playing).await;
    wait_for_playback(&session, |s| s.position_seconds > 0.0).await;

    session.playback().toggle_play_pause().await.unwrap();
    wait_for_playback(&session, |s| s.status == PlaybackStatus::Ready).await;
}

#[tokio::test(start_paused = true)]
async fn playback_returns_to_ready_when_audio_ends() {
    let (session, _engine) = stub_session(StubBehavior::Wav(0.5));

    session
        .generate_and_select("short clip", &VoiceSettings::default())
        .await
        .unwrap();
    wait_for_playback(&session, |s| s.status == PlaybackStatus::Ready).await;

    session.playback().toggle_play_pause().await.unwrap();
    wait_for_playback(&session, |s| s.status == PlaybackStatus::Playing).await;
    // the clip runs out and the primitive's ended event lands us back
    wait_for_playback(&session, |s| s.status == PlaybackStatus::Ready).await;
    let state = session.playback().state();
    assert!((state.position_seconds - 0.5).abs() < 1e-3);
}

#[tokio::test(start_paused = true)]
async fn seek_is_ignored_while_loading_and_clamped_when_ready() {
    let output = SimulatedOutput::new().with_load_delay(Duration::from_millis(300));
    let (session, _engine) = stub_session_with_output(StubBehavior::Wav(2.0), output);

    session
        .generate_and_select("seek target", &VoiceSettings::default())
        .await
        .unwrap();

    session.playback().seek(5.0);
    assert_eq!(session.playback().state().position_seconds, 0.0);

    wait_for_playback(&session, |s| s.status == PlaybackStatus::Ready).await;
    session.playback().seek(1000.0);
    wait_for_playback(&session, |s| (s.position_seconds - 2.0).abs() < 1e-3).await;
}

#[tokio::test(start_paused = true)]
async fn stop_pauses_and_rewinds() {
    let (session, _engine) = stub_session(StubBehavior::Wav(10.0));

    session
        .generate_and_select("stop me", &VoiceSettings::default())
        .await
        .unwrap();
    wait_for_playback(&session, |s| s.status == PlaybackStatus::Ready).await;

    session.playback().toggle_play_pause().await.unwrap();
    wait_for_playback(&session, |s| s.position_seconds > 0.0).await;

    session.playback().stop().await.unwrap();
    wait_for_playback(&session, |s| {
        s.status == PlaybackStatus::Ready && s.position_seconds == 0.0
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn volume_and_rate_are_clamped_and_allowed_while_idle() {
    let (session, _engine) = stub_session(StubBehavior::Silent);

    session.playback().set_volume(2.0);
    session.playback().set_playback_rate(100.0);
    let state = session.playback().state();
    assert_eq!(state.volume, 1.0);
    assert_eq!(state.rate, 4.0);

    session.playback().set_volume(-0.5);
    session.playback().set_playback_rate(0.01);
    let state = session.playback().state();
    assert_eq!(state.volume, 0.0);
    assert_eq!(state.rate, 0.25);
}

#[tokio::test(start_paused = true)]
async fn download_request_exposes_handle_and_filename() {
    let (session, _engine) = stub_session(StubBehavior::Wav(1.0));

    let artifact = session
        .generate("download me", &VoiceSettings::default())
        .await
        .unwrap();

    let request = session.download_request(artifact.id).unwrap();
    assert_eq!(request.filename, format!("voice-{}.wav", artifact.id));
    assert!(request.handle.bytes().is_some());

    // gone from history means gone from the download surface
    assert!(session.history().remove(artifact.id));
    assert!(session.download_request(artifact.id).is_none());
}

#[tokio::test(start_paused = true)]
async fn shutdown_releases_every_artifact_resource() {
    let (session, _engine) = stub_session(StubBehavior::Silent);

    for i in 0..3 {
        session
            .generate(&format!("clip {}", i), &VoiceSettings::default())
            .await
            .unwrap();
    }
    let handles: Vec<_> = session
        .history()
        .list()
        .into_iter()
        .map(|a| a.handle)
        .collect();
    assert_eq!(handles.len(), 3);

    match Arc::try_unwrap(session) {
        Ok(session) => session.shutdown().await,
        Err(_) => panic!("session still shared"),
    }
    assert!(handles.iter().all(|h| h.is_released()));
}
